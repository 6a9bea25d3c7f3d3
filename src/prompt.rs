//! Prompt text sent to the model.

use crate::types::{FieldDescriptor, JobContext};

/// Numbered question list, one line per field, with character limits
pub fn field_list(fields: &[FieldDescriptor], default_text_limit: usize) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| match field.char_limit(default_text_limit) {
            Some(limit) => format!("{}. {} (STRICT LIMIT: {} characters)", i + 1, field.label, limit),
            None => format!("{}. {}", i + 1, field.label),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the single prompt asking for every answer at once
pub fn build_prompt(
    fields: &[FieldDescriptor],
    resume_text: &str,
    job: &JobContext,
    default_text_limit: usize,
) -> String {
    let count = fields.len();
    let fields_list = field_list(fields, default_text_limit);

    format!(
        r#"You are an experienced professional filling in a job application form. Answers must read like a real person wrote them.

PAGE CONTENT (Job Posting):
Title: {title}
URL: {url}
{page}

YOUR RESUME:
{resume}

Form Fields to Fill:
{fields_list}

Task:
1. Read the page content and work out the job title, the company and the skills the role asks for.
2. Answer ALL {count} fields. Return a JSON array with exactly {count} strings, in the same order as the list above.

Rules:
- Tailor every answer to this job. Connect experience from the resume to what the posting asks for.
- Stay under each STRICT LIMIT. Finish your sentences; shorter and complete beats long and cut off.
- Sound human: contractions, concrete examples from the resume, no buzzwords, no markdown, no headings.
- Simple fields (name, email, phone, links): copy the exact value from the resume.
- Dropdown-style questions: give a short answer that would match an option, like "Yes", "No", a country or a degree.
- Numeric fields (salary, notice period, years of experience): digits only, no currency symbols or units. "50000", not "$50,000".
- If something is unknown or does not apply, use an empty string "". Never write "N/A".

Your JSON array:"#,
        title = job.page_title,
        url = job.url,
        page = job.page_content,
        resume = resume_text,
        fields_list = fields_list,
        count = count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::types::FieldKind;

    fn field(label: &str, kind: FieldKind, max_length: Option<usize>) -> FieldDescriptor {
        FieldDescriptor {
            node: NodeId(0),
            label: label.to_string(),
            kind,
            max_length,
        }
    }

    #[test]
    fn test_field_list_numbers_and_limits() {
        let fields = vec![
            field("Full name", FieldKind::Text { input_type: "text".into() }, None),
            field("Email", FieldKind::Text { input_type: "email".into() }, None),
            field("Why us", FieldKind::TextArea, Some(1000)),
            field("Country", FieldKind::Select, None),
        ];

        let list = field_list(&fields, 500);
        assert_eq!(
            list,
            "1. Full name (STRICT LIMIT: 500 characters)\n\
             2. Email\n\
             3. Why us (STRICT LIMIT: 1000 characters)\n\
             4. Country"
        );
    }

    #[test]
    fn test_prompt_embeds_context_and_count() {
        let fields = vec![
            field("Salary expectation", FieldKind::Text { input_type: "number".into() }, None),
            field("Cover letter", FieldKind::TextArea, None),
        ];
        let job = JobContext::new("Senior Rust Engineer at Acme", "Acme Careers", "https://acme.test/jobs/1", 3000);

        let prompt = build_prompt(&fields, "Jane Doe, 8 years of Rust", &job, 500);

        assert!(prompt.contains("Senior Rust Engineer at Acme"));
        assert!(prompt.contains("Jane Doe, 8 years of Rust"));
        assert!(prompt.contains("exactly 2 strings"));
        assert!(prompt.contains("1. Salary expectation\n2. Cover letter (STRICT LIMIT: 500 characters)"));
        assert!(prompt.contains("Never write \"N/A\""));
    }
}
