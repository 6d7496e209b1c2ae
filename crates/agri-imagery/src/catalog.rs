//! Static crop tables: placeholder glyph/colour and curated photo URLs.
//!
//! Keys are normalised names (trimmed, lowercase). Singular and plural forms
//! are listed separately.

/// Glyph and background colour (hex, no `#`) for a crop placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropGlyph {
    pub glyph: &'static str,
    pub color: &'static str,
}

/// Used for any crop missing from [`CROP_GLYPHS`].
pub const DEFAULT_GLYPH: CropGlyph = CropGlyph {
    glyph: "🌱",
    color: "22c55e",
};

/// Shown inline once every candidate image has failed.
pub const TERMINAL_GLYPH: char = '🌾';

macro_rules! glyph {
    ($glyph:literal, $color:literal) => {
        CropGlyph {
            glyph: $glyph,
            color: $color,
        }
    };
}

pub const CROP_GLYPHS: &[(&str, CropGlyph)] = &[
    // Vegetables
    ("tomatoes", glyph!("🍅", "ef4444")),
    ("tomato", glyph!("🍅", "ef4444")),
    ("lettuce", glyph!("🥬", "22c55e")),
    ("peppers", glyph!("🌶️", "f97316")),
    ("pepper", glyph!("🌶️", "f97316")),
    ("cucumber", glyph!("🥒", "22c55e")),
    ("cucumbers", glyph!("🥒", "22c55e")),
    ("carrots", glyph!("🥕", "f97316")),
    ("carrot", glyph!("🥕", "f97316")),
    ("onions", glyph!("🧅", "a855f7")),
    ("onion", glyph!("🧅", "a855f7")),
    ("cabbage", glyph!("🥬", "22c55e")),
    ("broccoli", glyph!("🥦", "22c55e")),
    ("cauliflower", glyph!("🥦", "f3f4f6")),
    ("eggplant", glyph!("🍆", "9333ea")),
    ("garlic", glyph!("🧄", "f3f4f6")),
    // Fruits
    ("strawberries", glyph!("🍓", "ef4444")),
    ("strawberry", glyph!("🍓", "ef4444")),
    ("blueberries", glyph!("🫐", "3b82f6")),
    ("blueberry", glyph!("🫐", "3b82f6")),
    ("apples", glyph!("🍎", "ef4444")),
    ("apple", glyph!("🍎", "ef4444")),
    // Herbs
    ("basil", glyph!("🌿", "22c55e")),
    ("mint", glyph!("🌿", "10b981")),
    ("parsley", glyph!("🌿", "22c55e")),
    ("cilantro", glyph!("🌿", "22c55e")),
    ("coriander", glyph!("🌿", "22c55e")),
    // Grains
    ("wheat", glyph!("🌾", "eab308")),
    ("rice", glyph!("🌾", "f3f4f6")),
    ("corn", glyph!("🌽", "eab308")),
    ("maize", glyph!("🌽", "eab308")),
    ("barley", glyph!("🌾", "d97706")),
    ("oats", glyph!("🌾", "d97706")),
    // Legumes
    ("beans", glyph!("🫘", "78350f")),
    ("peas", glyph!("🫛", "22c55e")),
    ("chickpeas", glyph!("🫘", "d97706")),
    ("lentils", glyph!("🫘", "ea580c")),
    // Roots
    ("potatoes", glyph!("🥔", "a855f7")),
    ("potato", glyph!("🥔", "a855f7")),
    ("sweet potatoes", glyph!("🍠", "f97316")),
    ("sweet potato", glyph!("🍠", "f97316")),
    ("radishes", glyph!("🌶️", "ef4444")),
    ("radish", glyph!("🌶️", "ef4444")),
    ("beets", glyph!("🥬", "dc2626")),
    ("beet", glyph!("🥬", "dc2626")),
    ("ginger", glyph!("🫚", "d97706")),
    // Leafy greens
    ("spinach", glyph!("🥬", "15803d")),
    ("kale", glyph!("🥬", "166534")),
    ("arugula", glyph!("🥬", "22c55e")),
    // Squash
    ("pumpkins", glyph!("🎃", "f97316")),
    ("pumpkin", glyph!("🎃", "f97316")),
    ("zucchini", glyph!("🥒", "22c55e")),
    ("squash", glyph!("🥒", "f97316")),
];

const TOMATO_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2015/05/31/11/26/tomatoes-791539_640.jpg",
    "https://images.unsplash.com/photo-1592924357228-91a4daadcfea?w=300",
    "https://images.pexels.com/photos/1327838/pexels-photo-1327838.jpeg?auto=compress&w=300",
];
const LETTUCE_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2017/09/04/18/39/lettuce-2714677_640.jpg",
    "https://images.unsplash.com/photo-1622206151226-18ca2c9ab4a1?w=300",
    "https://images.pexels.com/photos/1656666/pexels-photo-1656666.jpeg?auto=compress&w=300",
];
const PEPPER_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2016/03/05/22/31/bell-pepper-1239308_640.jpg",
    "https://images.unsplash.com/photo-1563565375-f3fdfdbefa83?w=300",
    "https://images.pexels.com/photos/128536/pexels-photo-128536.jpeg?auto=compress&w=300",
];
const CUCUMBER_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2014/11/27/18/36/cucumbers-548354_640.jpg",
    "https://images.unsplash.com/photo-1604977042946-1eecc30f269e?w=300",
    "https://images.pexels.com/photos/37528/cucumber-salad-food-healthy-37528.jpeg?auto=compress&w=300",
];
const CARROT_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2017/01/20/15/06/carrots-1995055_640.jpg",
    "https://images.unsplash.com/photo-1598170845058-32b9d6a5da37?w=300",
    "https://images.pexels.com/photos/143133/pexels-photo-143133.jpeg?auto=compress&w=300",
];
const ONION_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2013/02/21/19/11/onion-bulbs-84722_640.jpg",
    "https://images.unsplash.com/photo-1618512496248-a07fe83aa8cb?w=300",
];
const STRAWBERRY_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2016/04/15/08/04/strawberries-1330459_640.jpg",
    "https://images.unsplash.com/photo-1464965911861-746a04b4bca6?w=300",
    "https://images.pexels.com/photos/46174/strawberries-berries-fruit-freshness-46174.jpeg?auto=compress&w=300",
];
const BLUEBERRY_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2017/08/03/08/08/blueberries-2574744_640.jpg",
    "https://images.unsplash.com/photo-1498557850523-fd3d118b962e?w=300",
    "https://images.pexels.com/photos/39308/berries-fruits-food-blackberries-39308.jpeg?auto=compress&w=300",
];
const APPLE_PHOTOS: &[&str] =
    &["https://cdn.pixabay.com/photo/2017/06/20/22/14/man-2424039_640.jpg"];
const CORN_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2016/08/30/18/45/corn-1631245_640.jpg",
    "https://images.unsplash.com/photo-1551754655-cd27e38d2076?w=300",
];
const POTATO_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2016/08/11/08/43/potatoes-1585075_640.jpg",
    "https://images.unsplash.com/photo-1518977676601-b53f82aba655?w=300",
];
const SWEET_POTATO_PHOTOS: &[&str] = &[
    "https://cdn.pixabay.com/photo/2020/03/03/20/42/sweet-potato-4899015_640.jpg",
    "https://images.unsplash.com/photo-1589927986089-35812388d1f4?w=300",
];
const CORIANDER_PHOTOS: &[&str] =
    &["https://cdn.pixabay.com/photo/2017/03/16/21/18/coriander-2150856_640.jpg"];
const RADISH_PHOTOS: &[&str] =
    &["https://cdn.pixabay.com/photo/2016/08/09/10/30/radishes-1580017_640.jpg"];
const BEET_PHOTOS: &[&str] =
    &["https://cdn.pixabay.com/photo/2017/10/06/09/37/beetroot-2822587_640.jpg"];
const PUMPKIN_PHOTOS: &[&str] =
    &["https://cdn.pixabay.com/photo/2016/09/18/18/51/pumpkins-1678891_640.jpg"];

/// Curated photo URLs, tried in order before the generated placeholder.
pub const CURATED_URLS: &[(&str, &[&str])] = &[
    ("tomatoes", TOMATO_PHOTOS),
    ("tomato", TOMATO_PHOTOS),
    ("lettuce", LETTUCE_PHOTOS),
    ("peppers", PEPPER_PHOTOS),
    ("pepper", PEPPER_PHOTOS),
    ("cucumber", CUCUMBER_PHOTOS),
    ("cucumbers", CUCUMBER_PHOTOS),
    ("carrots", CARROT_PHOTOS),
    ("carrot", CARROT_PHOTOS),
    ("onions", ONION_PHOTOS),
    ("onion", ONION_PHOTOS),
    (
        "cabbage",
        &[
            "https://cdn.pixabay.com/photo/2017/09/30/15/10/savoy-cabbage-2802482_640.jpg",
            "https://images.unsplash.com/photo-1594282486552-05b4d80fbb9f?w=300",
        ],
    ),
    (
        "broccoli",
        &["https://cdn.pixabay.com/photo/2016/03/05/22/59/broccoli-1239271_640.jpg"],
    ),
    (
        "cauliflower",
        &["https://cdn.pixabay.com/photo/2017/01/19/08/21/cauliflower-1991104_640.jpg"],
    ),
    ("strawberries", STRAWBERRY_PHOTOS),
    ("strawberry", STRAWBERRY_PHOTOS),
    ("blueberries", BLUEBERRY_PHOTOS),
    ("blueberry", BLUEBERRY_PHOTOS),
    ("apples", APPLE_PHOTOS),
    ("apple", APPLE_PHOTOS),
    (
        "basil",
        &[
            "https://cdn.pixabay.com/photo/2016/03/02/20/42/basil-1232698_640.jpg",
            "https://images.unsplash.com/photo-1618375569909-3c8616cf7e55?w=300",
            "https://images.pexels.com/photos/4750270/pexels-photo-4750270.jpeg?auto=compress&w=300",
        ],
    ),
    (
        "mint",
        &[
            "https://cdn.pixabay.com/photo/2017/09/12/11/56/mint-2742871_640.jpg",
            "https://images.unsplash.com/photo-1628556270448-4d4e4148e1b1?w=300",
        ],
    ),
    (
        "parsley",
        &[
            "https://cdn.pixabay.com/photo/2017/03/16/21/18/parsley-2150843_640.jpg",
            "https://images.unsplash.com/photo-1583663848850-46af132dc08e?w=300",
        ],
    ),
    ("cilantro", CORIANDER_PHOTOS),
    ("coriander", CORIANDER_PHOTOS),
    (
        "wheat",
        &[
            "https://cdn.pixabay.com/photo/2016/08/11/08/04/wheat-1585612_640.jpg",
            "https://images.unsplash.com/photo-1574323347407-f5e1ad6d020b?w=300",
        ],
    ),
    (
        "rice",
        &[
            "https://cdn.pixabay.com/photo/2016/02/29/05/46/brown-rice-1226053_640.jpg",
            "https://images.unsplash.com/photo-1586201375761-83865001e31c?w=300",
        ],
    ),
    ("corn", CORN_PHOTOS),
    ("maize", CORN_PHOTOS),
    (
        "barley",
        &["https://cdn.pixabay.com/photo/2014/10/22/16/38/barley-field-498908_640.jpg"],
    ),
    (
        "oats",
        &["https://cdn.pixabay.com/photo/2016/11/14/03/05/oats-1822575_640.jpg"],
    ),
    (
        "beans",
        &["https://cdn.pixabay.com/photo/2015/05/30/01/18/green-beans-789488_640.jpg"],
    ),
    (
        "peas",
        &["https://cdn.pixabay.com/photo/2015/05/31/13/10/peas-791357_640.jpg"],
    ),
    (
        "chickpeas",
        &["https://cdn.pixabay.com/photo/2017/10/03/22/01/chickpeas-2813262_640.jpg"],
    ),
    (
        "lentils",
        &["https://cdn.pixabay.com/photo/2017/09/06/08/41/lentils-2720785_640.jpg"],
    ),
    ("potatoes", POTATO_PHOTOS),
    ("potato", POTATO_PHOTOS),
    ("sweet potatoes", SWEET_POTATO_PHOTOS),
    ("sweet potato", SWEET_POTATO_PHOTOS),
    ("radishes", RADISH_PHOTOS),
    ("radish", RADISH_PHOTOS),
    ("beets", BEET_PHOTOS),
    ("beet", BEET_PHOTOS),
    (
        "spinach",
        &[
            "https://cdn.pixabay.com/photo/2017/05/09/03/46/spinach-2297606_640.jpg",
            "https://images.unsplash.com/photo-1576045057995-568f588f82fb?w=300",
        ],
    ),
    (
        "kale",
        &[
            "https://cdn.pixabay.com/photo/2016/07/17/08/30/kale-1523039_640.jpg",
            "https://images.unsplash.com/photo-1560200265-e8abb047b0c0?w=300",
        ],
    ),
    (
        "arugula",
        &["https://cdn.pixabay.com/photo/2019/09/18/18/31/arugula-4487056_640.jpg"],
    ),
    ("pumpkins", PUMPKIN_PHOTOS),
    ("pumpkin", PUMPKIN_PHOTOS),
    (
        "zucchini",
        &["https://cdn.pixabay.com/photo/2017/07/01/18/40/zucchini-2462511_640.jpg"],
    ),
    (
        "squash",
        &["https://cdn.pixabay.com/photo/2016/09/15/08/03/pumpkin-1671450_640.jpg"],
    ),
    (
        "eggplant",
        &["https://cdn.pixabay.com/photo/2014/10/03/10/23/eggplant-472101_640.jpg"],
    ),
    (
        "garlic",
        &["https://cdn.pixabay.com/photo/2014/08/06/19/31/garlic-411499_640.jpg"],
    ),
    (
        "ginger",
        &["https://cdn.pixabay.com/photo/2017/03/26/21/59/ginger-2176405_640.jpg"],
    ),
];

/// Glyph for a normalised crop name, or [`DEFAULT_GLYPH`].
pub fn glyph_for(normalized: &str) -> CropGlyph {
    CROP_GLYPHS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(DEFAULT_GLYPH)
}

/// Curated URLs for a normalised crop name; empty when none are known.
pub fn curated_urls(normalized: &str) -> &'static [&'static str] {
    CURATED_URLS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, urls)| *urls)
        .unwrap_or(&[])
}
