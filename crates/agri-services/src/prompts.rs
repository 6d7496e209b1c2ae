//! Fixed prompts sent to the generative model.

pub const SOIL_ANALYSIS_PROMPT: &str = r#"Analyze this soil image and return ONLY a simple list of the top 5 crops that grow best in this soil.

IMPORTANT: Your response must be ONLY crop names, one per line, in this EXACT format:
CropName1
CropName2
CropName3
CropName4
CropName5

No explanations, no descriptions, no emojis, no extra text. Just the crop names, each on a new line.

Example correct response:
Rice
Wheat
Corn
Sugarcane
Cotton

If this is not soil, respond with only: "NotSoil""#;

/// Exact reply the model gives for a non-soil image.
pub const NOT_SOIL_REPLY: &str = "NotSoil";

pub const DISEASE_ANALYSIS_PROMPT: &str = "Analyze this plant leaf image for diseases. Act as an expert plant pathologist. 👨‍⚕️🌿 Your response should be clear, well-structured, and use emojis to enhance readability. Use markdown for bolding important keywords (e.g., **Diagnosis**, **Symptoms**). Provide a detailed diagnosis, describe symptoms, and suggest both organic and chemical treatment options. If the plant appears healthy, state that clearly and offer tips for keeping it healthy.";

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are AgriGenius, a friendly and knowledgeable AI assistant for farmers. 🤖🌾 Your answers should be concise, helpful, and practical. Use emojis to make your advice more engaging and markdown for **bolding** key terms. If asked about non-farming topics, gently steer the conversation back to agriculture.";

pub const CHAT_GREETING: &str =
    "Hello! I'm AgriGenius. Ask me anything about farming, from crop cycles to soil health.";

pub fn planting_guide_prompt(crop: &str) -> String {
    format!(
        "Provide a comprehensive planting guide for {crop} in simple, clear steps.

Include:
1. 🌱 Planting Season: Best time to plant
2. 🌡️ Temperature: Ideal growing temperature
3. 💧 Water Needs: How often to water
4. ☀️ Sunlight: Hours of sun needed
5. 🌾 Soil Type: Best soil conditions
6. 📏 Spacing: Plant spacing requirements
7. ⏰ Growing Time: Days to harvest
8. 🌿 Care Tips: Simple maintenance tips
9. 🐛 Common Pests: What to watch for
10. 🥗 Harvest Guide: When and how to harvest

Keep it simple, practical, and easy to understand. Use bullet points."
    )
}
