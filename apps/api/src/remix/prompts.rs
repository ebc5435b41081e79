// Prompt templates for LinkedIn-style remix generation.

/// Fixed system instruction sent with every remix request.
pub const SYSTEM_PROMPT: &str = "You are a LinkedIn content expert. Create engaging, \
    professional LinkedIn posts that drive engagement and provide value to the audience. \
    Focus on storytelling, insights, and actionable takeaways.";

/// Builds the per-style user prompt: the base LinkedIn requirements plus a
/// style-specific guidance block. Unrecognized style tags get the base
/// prompt only.
pub fn build_prompt(content: &str, style: &str) -> String {
    let base = format!(
        "Create a LinkedIn post based on this content: \"{content}\"\n\n\
         Requirements:\n\
         - Professional tone\n\
         - Engaging opening hook\n\
         - Clear value proposition\n\
         - Include relevant hashtags (3-5)\n\
         - End with a call-to-action or question\n\
         - Keep under 1,300 characters (LinkedIn limit)\n\
         - Use line breaks for readability\n\n\
         Post type: {style}"
    );

    match style_guidance(style) {
        Some(guidance) => format!("{base}\n\nStyle: {guidance}"),
        None => base,
    }
}

fn style_guidance(style: &str) -> Option<&'static str> {
    match style {
        "storytelling" => Some(
            "Tell a compelling story that relates to the content. Use \"I\" statements \
             and personal experience. Make it relatable and authentic.",
        ),
        "insights" => Some(
            "Share key insights and lessons learned. Focus on \"what I discovered\" or \
             \"here's what I learned.\" Be educational and thought-provoking.",
        ),
        "tips" => Some(
            "Provide actionable tips and advice. Use numbered lists or bullet points. \
             Make it practical and immediately useful.",
        ),
        "question" => Some(
            "Pose thought-provoking questions that encourage discussion. Start with a \
             question and build context around it.",
        ),
        "achievement" => Some(
            "Celebrate a win or milestone related to the content. Be humble but \
             confident. Share the journey, not just the result.",
        ),
        "industry_trend" => Some(
            "Discuss industry trends or observations. Be forward-thinking and show \
             expertise. Connect to broader business implications.",
        ),
        _ => None,
    }
}
