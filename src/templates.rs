const PROMPT_PLACEHOLDER: &str = "{prompt}";

// everything that differs between the callable endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptTemplate {
    // route name, also the metrics label
    pub endpoint: &'static str,
    pub system: &'static str,
    pub user_template: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub result_field: &'static str,
}

impl PromptTemplate {
    pub fn user_message(&self, prompt: &str) -> String {
        self.user_template.replace(PROMPT_PLACEHOLDER, prompt)
    }
}

pub const SOLVE: PromptTemplate = PromptTemplate {
    endpoint: "solve",
    system: r#"You are an expert tutor who solves student questions step by step.
Respond with a single raw JSON object and nothing else: no markdown, no code fences, no commentary.
The object must have exactly these fields:
  "subject": the subject area of the question (for example "Calculus"),
  "level": the education level the question is pitched at,
  "answer": the final answer, using LaTeX between $ delimiters for any mathematics,
  "workings": an array of strings, one per step, each using LaTeX between $ delimiters for mathematics.
Escape backslashes so the output is valid JSON."#,
    user_template: "Solve the following question and show your working:\n\n{prompt}",
    temperature: 0.0,
    max_tokens: 1200,
    result_field: "solution",
};

pub const PRACTICE_VARIANT: PromptTemplate = PromptTemplate {
    endpoint: "generate-practice-variant",
    system: r#"You are an expert tutor who writes practice questions.
Given a question, write one new question that tests the same skill at the same difficulty, with different numbers or context.
Respond with a single raw JSON object and nothing else: no markdown, no code fences, no commentary.
The object must have exactly these fields:
  "subject": the subject area,
  "level": the education level,
  "question": the new question, using LaTeX between $ delimiters for any mathematics,
  "answer": the final answer to the new question,
  "workings": an array of strings, one per solution step.
Escape backslashes so the output is valid JSON."#,
    user_template: "Write a practice question similar to this one:\n\n{prompt}",
    temperature: 0.8,
    max_tokens: 1000,
    result_field: "practiceQuestion",
};

pub const HARDER_VARIANT: PromptTemplate = PromptTemplate {
    endpoint: "generate-harder-variant",
    system: r#"You are an expert tutor who helps students progress.
Given a question, write one new question on the same topic that is one step harder: it should need an extra idea or an extra step compared to the original.
Respond with a single raw JSON object and nothing else: no markdown, no code fences, no commentary.
The object must have exactly these fields:
  "subject": the subject area,
  "level": the education level of the new question,
  "question": the new question, using LaTeX between $ delimiters for any mathematics,
  "answer": the final answer to the new question,
  "workings": an array of strings, one per solution step.
Escape backslashes so the output is valid JSON."#,
    user_template: "Write a harder follow-up question to this one:\n\n{prompt}",
    temperature: 0.8,
    max_tokens: 1000,
    result_field: "nextLevelQuestion",
};
