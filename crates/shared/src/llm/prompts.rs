const CAMPUS_PERSONA: &str = "You are an AI assistant for SRM Guide, built to help freshers at SRM University (SRM Institute of Science and Technology) navigate college life.";

const CAMPUS_FACTS: &[&str] = &[
    "Located in Kattankulathur, Chennai, Tamil Nadu",
    "Follows a semester system with credit-based evaluation",
    "Minimum 75% attendance required for all courses",
    "Grading scale: A(10), B(9), C(8), D(7), E(6), F(0)",
    "Total B.Tech credits required: 160",
    "Exam pattern: 3 Cycle Tests (30 marks) + Internal Assessment (20 marks) + End Semester Exam (50 marks) = 100 marks",
    "Pass criteria: minimum 40% in both internal and end semester, 50% overall to pass",
    "Cycle tests happen in weeks 4-5, 8-9, and 12-13 of the semester",
    "Hostels provide mess, Wi-Fi, and recreational facilities",
    "An active placement cell brings top companies to campus",
];

const ACCURACY_INSTRUCTION: &str = "Provide accurate, helpful, and specific information about SRM University. If you're unsure about a detail, say so and suggest contacting the university directly.";

const TONE_INSTRUCTION: &str = "Respond in a friendly, helpful manner, as a senior student guiding a fresher.";

pub fn campus_assistant_prompt(user_message: &str) -> String {
    let facts = CAMPUS_FACTS
        .iter()
        .map(|fact| format!("- {fact}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{CAMPUS_PERSONA}\n\nKey SRM University information:\n{facts}\n\n{ACCURACY_INSTRUCTION}\n\nUser question: {}\n\n{TONE_INSTRUCTION}\n",
        user_message.trim()
    )
}

pub fn blog_post_prompt(topic: &str) -> String {
    format!(
        "Write a comprehensive blog post about \"{}\" specifically for SRM University freshers.\nInclude practical tips, specific information about SRM, and actionable advice.\nFormat the response in HTML with proper headings (h2, h3), paragraphs, and lists.\nMake it engaging and informative for first-year students.\n",
        topic.trim()
    )
}
