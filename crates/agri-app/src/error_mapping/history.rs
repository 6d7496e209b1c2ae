use agri_core::{AppError, StorageError};
use agri_services::HistoryError;

pub(super) fn to_app_error(e: HistoryError) -> AppError {
    match e {
        HistoryError::Read(e) => AppError::Storage(StorageError::ReadFailed(format!("{:#}", e))),
        HistoryError::Write(e) => AppError::Storage(StorageError::WriteFailed(format!("{:#}", e))),
        HistoryError::Corrupt(e) => AppError::Storage(StorageError::Corruption(e.to_string())),
    }
}
