//! Prompt construction for the sprint-planning report.
//!
//! Assembles the fixed instruction block, the delimited transcript, and
//! the caller's fixed instruction into one prompt string. Pure logic, no
//! I/O, no failure modes: any transcript (including empty) produces a
//! well-formed prompt.

/// Marker opening the transcript block. Chosen so it cannot plausibly
/// occur inside a real transcript; everything between the markers is data,
/// not instructions.
pub const TRANSCRIPT_START: &str = "=== [TRANSCRIPT START] ===";

/// Marker closing the transcript block.
pub const TRANSCRIPT_END: &str = "=== [TRANSCRIPT END] ===";

/// Role, goal, and output-format instructions included in every prompt.
///
/// Defines exactly three output tags (`title`, `summary`, `wbs`) and the
/// JSON schema expected inside `<wbs>`. The tags drive the server-side
/// extraction, so the prompt forbids markdown code fences around them.
const SYSTEM_PROMPT: &str = r#"# Role
You are a senior technical project manager with 15 years of experience.
You summarize messy technical meetings for non-technical stakeholders, and
you break vague requirements down into concrete development units grouped
by stack and ordered by dependency.

# Input
The meeting transcript between the transcript markers below.

# Goal
Analyze the transcript and produce a Sprint Planning Report with the three
sections described here. IMPORTANT: each section MUST be wrapped in its
designated tag (`<tag>...</tag>`) for automated server-side parsing. Do
NOT wrap any section in markdown code fences.

## Section 0: Project Title
An intuitive, professional project name capturing the core topic.
Output format: wrap it in a `<title>` tag.

## Section 1: Executive Summary
For executives and stakeholders. Plain business language; put a short
critical-analysis list (unclear requirements, technical contradictions,
schedule risks -- or "nothing notable") first, then a general summary of
the state of the project and the decisions made in this meeting.
Output format: wrap the whole section in one `<summary>` tag.

## Section 2: Structured WBS
For the engineers who will do the work.
Output format: wrap valid JSON in a `<wbs>` tag, pure JSON text only:

<wbs>
{
    "works": [
        {
            "field": "BE",
            "title": "User authentication",
            "level": 3,
            "tasks": [
                "Design the users table schema",
                "Implement POST /login"
            ]
        }
    ],
    "general_tasks": [
        "Final review of the product brief"
    ]
}
</wbs>

JSON rules:
1. The top-level object has exactly two keys: "works" and "general_tasks".
2. "works" entries carry: "field" (one of BE, FE, CL, AI), "title" (module
   name), "level" (difficulty as an integer: 1 low, 2 medium, 3 high), and
   "tasks" (the concrete steps for that module).
3. "general_tasks" is a list of strings: action items that belong to no
   particular stack.
4. Order both lists by intended execution order.

# Constraints
- Where the transcript is ambiguous, make a reasonable technical inference
  and flag it as an inference in the summary's critical analysis.
- Exclude small talk unrelated to the work.
"#;

/// Build the full prompt: instruction block, delimited transcript, fixed
/// internal instruction.
///
/// The transcript appears exactly once, between [`TRANSCRIPT_START`] and
/// [`TRANSCRIPT_END`]; `instruction` is appended after the block.
pub fn build_prompt(transcript: &str, instruction: &str) -> String {
    let mut prompt = String::with_capacity(
        SYSTEM_PROMPT.len() + transcript.len() + instruction.len() + 64,
    );

    prompt.push_str(SYSTEM_PROMPT);
    prompt.push('\n');
    prompt.push_str(TRANSCRIPT_START);
    prompt.push('\n');
    prompt.push_str(transcript);
    prompt.push('\n');
    prompt.push_str(TRANSCRIPT_END);
    prompt.push('\n');
    prompt.push_str(instruction);

    prompt
}
