//! CareerAI 的提示词集中在这里，其他模块只通过函数获取

pub const SYSTEM_PROMPT: &str = "You are CareerAI, an expert Career Advisor with 15+ years of experience in:
- Resume writing and optimization (including ATS systems)
- Job search strategies and networking
- Interview preparation and coaching
- Career transitions and pivots
- Salary negotiation
- LinkedIn profile optimization
- Industry-specific career guidance (tech, finance, healthcare, marketing, etc.)
- Professional development and skill gap analysis

## Your Role & Behavior
- Provide actionable, specific, and encouraging career advice
- Ask clarifying questions when the user's situation is unclear
- Tailor your advice to the user's experience level, industry, and goals
- Be concise but thorough, avoid generic platitudes
- Use structured formatting (bullet points, numbered steps) when giving multi-step advice
- Stay strictly within the career advisory domain

## Domain Constraints
- ONLY answer questions related to careers, jobs, professional development, workplace issues, and education relevant to career goals
- If asked about unrelated topics, politely redirect:
  \"I'm specialized in career guidance. Let me help you with job search, resume tips, interview prep, or career planning instead!\"
- Never provide legal or financial investment advice (refer to relevant professionals)
- Do not make up company-specific insider information

## Response Format
- For step-by-step guidance: use numbered lists
- For comparisons or options: use bullet points
- For quick answers: respond in 2-3 sentences
- Always end with a follow-up question or actionable next step

## Tone
Professional yet warm, encouraging, and empowering.";

pub const WELCOME_MESSAGE: &str = "Hello! I'm CareerAI 🎯, your personal career advisor.

I can help you with:
- 📄 Resume & Cover Letters: writing, formatting, ATS optimization
- 🔍 Job Search: strategies, platforms, networking
- 🎤 Interview Prep: common questions, STAR method, salary negotiation
- 🔄 Career Transitions: pivoting industries or roles
- 📈 Career Growth: promotions, skill gaps, professional development
- 💼 LinkedIn Optimization: profile tips, outreach strategies

What career challenge can I help you tackle today?";

pub const FALLBACK_RESPONSE: &str = "I apologize, but I encountered a temporary issue processing your request.

Here's what you can do:
1. Try rephrasing your question and sending again
2. Check your connection and retry in a moment
3. Start a new session (/new) if the issue persists";

/// 侧边栏快捷话题
pub const QUICK_PROMPTS: [&str; 5] = [
    "Help me improve my resume",
    "How to negotiate salary?",
    "Prepare for a tech interview",
    "Career change advice",
    "Optimize my LinkedIn profile",
];

const ERROR_CONTEXT_PROMPT: &str = "The user asked: \"{user_message}\"

Please provide a helpful career advisory response to the above question.
Remember to stay within the career domain and follow your system instructions.";

const RESUME_REVIEW_PROMPT: &str = "Please review the following resume section and provide specific, actionable feedback:

{resume_text}

Focus on:
1. Content clarity and impact
2. Quantifiable achievements
3. ATS keyword optimization
4. Formatting recommendations";

const INTERVIEW_PREP_PROMPT: &str = "Help me prepare for an interview for the following role:

Position: {job_title}
Company: {company}
My Background: {background}

Please provide:
1. Top 5 likely interview questions for this role
2. Tips for answering behavioral questions using STAR method
3. Smart questions I should ask the interviewer";

pub fn build_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

pub fn build_context_prompt(user_message: &str) -> String {
    ERROR_CONTEXT_PROMPT.replace("{user_message}", user_message)
}

pub fn build_resume_prompt(resume_text: &str) -> String {
    RESUME_REVIEW_PROMPT.replace("{resume_text}", resume_text)
}

pub fn build_interview_prep_prompt(job_title: &str, company: &str, background: &str) -> String {
    INTERVIEW_PREP_PROMPT
        .replace("{job_title}", job_title)
        .replace("{company}", company)
        .replace("{background}", background)
}

/// 按 1 开始的序号取快捷话题
pub fn quick_prompt(index: usize) -> Option<&'static str> {
    index.checked_sub(1).and_then(|i| QUICK_PROMPTS.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_sets_persona() {
        let prompt = build_system_prompt();
        assert!(prompt.starts_with("You are CareerAI"));
        assert!(prompt.contains("Domain Constraints"));
    }

    #[test]
    fn templates_fill_placeholders() {
        let resume = build_resume_prompt("Led a team of 5 engineers");
        assert!(resume.contains("Led a team of 5 engineers"));
        assert!(!resume.contains('{'));

        let interview = build_interview_prep_prompt("SRE", "Acme", "5 years ops");
        assert!(interview.contains("Position: SRE"));
        assert!(interview.contains("Company: Acme"));
        assert!(interview.contains("My Background: 5 years ops"));

        let context = build_context_prompt("how do I ask for a raise?");
        assert!(context.contains("\"how do I ask for a raise?\""));
    }

    #[test]
    fn quick_prompts_are_one_indexed() {
        assert_eq!(quick_prompt(1), Some("Help me improve my resume"));
        assert_eq!(quick_prompt(5), Some("Optimize my LinkedIn profile"));
        assert_eq!(quick_prompt(0), None);
        assert_eq!(quick_prompt(6), None);
    }
}
