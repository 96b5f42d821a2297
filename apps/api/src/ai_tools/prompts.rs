// AI tools prompt templates and builders.
// Every builder is a pure function of its inputs: same fields, same bytes.
// Absent optional fields are dropped from the prompt unless a default is listed below.

use serde_json::{json, Value};

use crate::ai_tools::models::{
    EmailTask, InterviewQuestionsTask, JobDescriptionTask, QueryTask,
};
use crate::llm_client::PromptPair;
use crate::models::candidate::CandidateRow;
use crate::models::company::CompanyRow;
use crate::models::job::JobRow;

pub const CV_ANALYSIS_SYSTEM: &str = "You are an expert HR assistant specializing in CV analysis. \
    Extract and structure key information from CVs/resumes.";

pub const JOB_DESCRIPTION_SYSTEM: &str = "You are an expert HR consultant who creates compelling \
    and comprehensive job descriptions.";

pub const INTERVIEW_SYSTEM: &str = "You are an experienced interviewer who creates thoughtful, \
    role-specific interview questions.";

pub const EMAIL_SYSTEM: &str = "You are a professional email writer who creates clear, concise, \
    and appropriately toned business emails.";

pub const MATCH_JOBS_SYSTEM: &str = "You are an expert job matching specialist who analyzes \
    candidate profiles against job requirements.";

pub const QUERY_SYSTEM: &str = "You are an AI recruitment assistant. Help with recruitment-related \
    queries, provide advice, and answer questions professionally.";

pub const DEFAULT_COMPANY_NAME: &str = "A leading company";
pub const DEFAULT_INDUSTRY: &str = "Technology";
pub const DEFAULT_EXPERIENCE_LEVEL: &str = "Mid-level";
pub const DEFAULT_INTERVIEW_POSITION: &str = "General";
pub const DEFAULT_QUESTION_TYPES: &str = "Mix of technical, behavioral, and situational";
pub const DEFAULT_TONE: &str = "Professional and friendly";
pub const DEFAULT_SENDER_NAME: &str = "Hiring Manager";
pub const DEFAULT_SENDER_ROLE: &str = "Talent Acquisition";
/// Sending organisation named in every email signature.
pub const SENDER_COMPANY: &str = "RecruitmentPlus";

/// Jobs embedded in a match prompt, at most.
pub const MAX_MATCH_JOBS: usize = 20;
/// Characters of each job description kept in a match prompt.
pub const JOB_DESCRIPTION_PREVIEW_CHARS: usize = 200;

// The instruction block sits in its own blank-line-delimited section and never
// contains "name:", "email:" or "phone:", so an echoed prompt cannot confuse the
// section reducer. The CV text is likewise kept apart from its header.
const CV_ANALYSIS_INSTRUCTIONS: &str = "\
Analyze this CV and extract the following information in a structured format:
- Candidate name
- Contact information (email, phone)
- Professional summary
- Total years of experience
- Skills (technical and soft skills)
- Education (degree, institution, year)
- Work experience (company, position, duration, key achievements)
- Languages
- Certifications

Put each item in its own paragraph, as a 'Label: value' line, separated by a blank line.";

const JOB_DESCRIPTION_CHECKLIST: &str = "\
Include:
1. Job Title
2. Brief company introduction
3. Role overview
4. Key responsibilities (5-7 points)
5. Required qualifications
6. Preferred qualifications
7. Benefits (if applicable)
8. Skills required

Make it professional, engaging, and inclusive.";

const INTERVIEW_CHECKLIST: &str = "\
Provide:
1. 5 Technical questions (if applicable)
2. 5 Behavioral questions (STAR method)
3. 3 Situational questions
4. 2 Culture fit questions
5. 2 Questions about career goals

For each question, provide a brief note on what to look for in the answer.";

const EMAIL_CHECKLIST: &str = "\
Include:
- Appropriate greeting
- Clear subject line suggestion
- Well-structured body
- Professional closing
- Signature block

Make it personalized and engaging while maintaining professionalism.";

const MATCH_JOBS_CHECKLIST: &str = "\
For each matching job, provide:
1. Match percentage (0-100%)
2. Matching skills/qualifications
3. Gaps or missing requirements
4. Why this is a good/poor match
5. Suggestions for the candidate

Rank jobs by match percentage, highest first.";

/// A resolved email recipient.
#[derive(Debug, Clone, Copy)]
pub enum Recipient<'a> {
    Candidate(&'a CandidateRow),
    Company(&'a CompanyRow),
}

pub fn build_cv_analysis_prompt(cv_text: &str) -> PromptPair {
    PromptPair {
        system_instruction: CV_ANALYSIS_SYSTEM,
        user_content: format!("{CV_ANALYSIS_INSTRUCTIONS}\n\nCV Text:\n\n{cv_text}"),
    }
}

pub fn build_job_description_prompt(task: &JobDescriptionTask) -> PromptPair {
    let mut fields = vec![
        format!("Position: {}", task.position),
        format!(
            "Company: {}",
            task.company_name.as_deref().unwrap_or(DEFAULT_COMPANY_NAME)
        ),
        format!(
            "Industry: {}",
            task.industry.as_deref().unwrap_or(DEFAULT_INDUSTRY)
        ),
        format!(
            "Experience Level: {}",
            task.experience_level
                .as_deref()
                .unwrap_or(DEFAULT_EXPERIENCE_LEVEL)
        ),
    ];
    if let Some(requirements) = &task.requirements {
        fields.push(format!("Specific Requirements: {requirements}"));
    }

    PromptPair {
        system_instruction: JOB_DESCRIPTION_SYSTEM,
        user_content: format!(
            "Create a detailed job description for the following position:\n\n{}\n\n{}",
            fields.join("\n"),
            JOB_DESCRIPTION_CHECKLIST
        ),
    }
}

pub fn build_interview_prompt(
    task: &InterviewQuestionsTask,
    candidate: Option<&CandidateRow>,
) -> PromptPair {
    let mut fields = vec![format!(
        "Position: {}",
        task.position.as_deref().unwrap_or(DEFAULT_INTERVIEW_POSITION)
    )];
    if let Some(candidate) = candidate {
        fields.push(candidate_summary(candidate));
    }
    fields.push(format!(
        "Experience Level: {}",
        task.experience_level
            .as_deref()
            .unwrap_or(DEFAULT_EXPERIENCE_LEVEL)
    ));
    if !task.skills.is_empty() {
        fields.push(format!("Focus Skills: {}", task.skills.join(", ")));
    }
    let question_types = if task.question_types.is_empty() {
        DEFAULT_QUESTION_TYPES.to_string()
    } else {
        task.question_types.join(", ")
    };
    fields.push(format!("Question Types: {question_types}"));

    PromptPair {
        system_instruction: INTERVIEW_SYSTEM,
        user_content: format!(
            "Generate interview questions for:\n\n{}\n\n{}",
            fields.join("\n"),
            INTERVIEW_CHECKLIST
        ),
    }
}

pub fn build_email_prompt(task: &EmailTask, recipient: Option<Recipient<'_>>) -> PromptPair {
    let mut fields = Vec::new();
    if let Some(recipient) = recipient {
        fields.push(recipient_line(recipient));
    }
    fields.push(format!("Purpose: {}", task.email_purpose));
    if let Some(context) = &task.context {
        fields.push(format!("Context: {context}"));
    }
    fields.push(format!(
        "Tone: {}",
        task.tone.as_deref().unwrap_or(DEFAULT_TONE)
    ));

    let sender = [
        format!(
            "Sender: {}",
            task.sender_name.as_deref().unwrap_or(DEFAULT_SENDER_NAME)
        ),
        format!(
            "Role: {}",
            task.sender_role.as_deref().unwrap_or(DEFAULT_SENDER_ROLE)
        ),
        format!("Company: {SENDER_COMPANY}"),
    ];

    PromptPair {
        system_instruction: EMAIL_SYSTEM,
        user_content: format!(
            "Write a professional email for the following:\n\n{}\n\n{}\n\n{}",
            fields.join("\n"),
            sender.join("\n"),
            EMAIL_CHECKLIST
        ),
    }
}

/// Only the first `MAX_MATCH_JOBS` jobs are listed, numbered from 1.
pub fn build_match_jobs_prompt(profile: &Value, jobs: &[JobRow]) -> PromptPair {
    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| profile.to_string());

    let listing = jobs
        .iter()
        .take(MAX_MATCH_JOBS)
        .enumerate()
        .map(|(index, job)| job_listing(index + 1, job))
        .collect::<Vec<_>>()
        .join("\n\n");

    PromptPair {
        system_instruction: MATCH_JOBS_SYSTEM,
        user_content: format!(
            "Match this candidate to suitable jobs:\n\nCandidate Profile:\n{profile_json}\n\n\
             Available Jobs:\n{listing}\n\n{MATCH_JOBS_CHECKLIST}"
        ),
    }
}

pub fn build_query_prompt(task: &QueryTask) -> PromptPair {
    let user_content = match &task.context {
        Some(context) => format!("Context: {context}\n\nQuery: {}", task.query),
        None => task.query.clone(),
    };
    PromptPair {
        system_instruction: QUERY_SYSTEM,
        user_content,
    }
}

/// The profile sent for a persisted candidate.
pub fn candidate_profile(candidate: &CandidateRow) -> Value {
    json!({
        "name": candidate.full_name(),
        "position": candidate.position,
        "skills": candidate.skills,
        "experience": candidate.experience,
        "education": candidate.education,
    })
}

fn candidate_summary(candidate: &CandidateRow) -> String {
    let mut parts = vec![format!("Candidate: {}", candidate.full_name())];
    if let Some(position) = &candidate.position {
        parts.push(format!("Position: {position}"));
    }
    if !candidate.skills.is_empty() {
        parts.push(format!("Skills: {}", candidate.skills.join(", ")));
    }
    parts.join(", ")
}

fn recipient_line(recipient: Recipient<'_>) -> String {
    match recipient {
        Recipient::Candidate(c) => match &c.position {
            Some(position) => format!(
                "Recipient: {} (Candidate for {position})",
                c.full_name()
            ),
            None => format!("Recipient: {} (Candidate)", c.full_name()),
        },
        Recipient::Company(c) => match &c.industry {
            Some(industry) => format!("Recipient: {} ({industry} industry)", c.name),
            None => format!("Recipient: {}", c.name),
        },
    }
}

fn job_listing(number: usize, job: &JobRow) -> String {
    let requirements = job.requirements.as_deref().unwrap_or("Not specified");
    let description = match &job.description {
        Some(d) => format!(
            "{}...",
            d.chars()
                .take(JOB_DESCRIPTION_PREVIEW_CHARS)
                .collect::<String>()
        ),
        None => "Not specified".to_string(),
    };
    format!(
        "{number}. {} at {}\n   Requirements: {requirements}\n   Description: {description}",
        job.title, job.company
    )
}
