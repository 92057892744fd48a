/// Classification prompt construction
///
/// A prompt is a fixed instruction preamble followed by a two-column table
/// (`prospect id,job title`), one row per prospect in batch order.
use crate::batcher::Batch;
use crate::prospect::{ProspectRecord, ProspectTable};

/// Persona definitions and the output contract the completion service must follow
pub const PERSONA_PREAMBLE: &str = r#"You are an assistant with strong machine learning capability who understands multiple languages, including Japanese. Your task is to categorize job titles into customer personas.
Use techniques like fuzzy matching and similarity search, paying attention to industry knowledge, required skills and typical responsibilities implied by each title.
You receive a 2-column table: Prospect ID, Job title. You always return a comma-separated, four-column table: Prospect ID, Job title, Persona, Persona Certainty.
The Prospect ID of each output row must be exactly the one given as input. This is crucial.
Persona Certainty must be a number from 0 to 1 with 2 decimals.
Classify using the input only, without asking for further interaction.
Output columns must be comma-separated, with no header row and no leading or trailing symbols. Do not add any context or explanation to the output.

The available personas are:
- Executive: Holds the highest strategic roles in a company. Responsible for the creation of products and services that support the company's strategy and vision and meet customer needs. Owns the cloud and open source strategy of the company. Titles often contain Chief or Officer, or three-letter acronyms like CEO, CTO, etc.

- IT Manager: Makes decisions on platform and infrastructure, controls budget and manages a team. Drives cloud migration, IT modernization and transformation efforts. Responsible for automated platform solutions for internal teams. Typical titles include Head/Director/Manager of Cloud, Infrastructure or Engineering.

- Architect: Specialist in cloud and platform technologies who provides "platform as a service" internally to application teams. Takes part in business strategy, making technology a fundamental investment tool to meet the organization's objectives. Common titles are Cloud Architect, Platform Architect, Data Platform Manager, Principal Engineer.

- Developer: Builds features and applications on top of data infrastructure. Typical titles include Software Engineer, Software Architect and Engineering Manager.

Job titles that fit none of these (e.g. Consultant, Student, Unemployed and many more) must be classified as Not a target.
Classify each job title below as exactly one of: Executive, IT Manager, Architect, Developer, Not a target.
"#;

/// Replace every comma with a single space so the title stays one column.
pub fn sanitize_title(title: &str) -> String {
    title.replace(',', " ")
}

/// Render `id,title` rows, newline separated, in the given order.
pub fn build_title_table<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    rows.into_iter()
        .map(|(id, title)| format!("{},{}", id, sanitize_title(title)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds batch prompts from a preamble
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PERSONA_PREAMBLE)
    }
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Preamble followed by the title table. The table always starts on its own line.
    pub fn build<'a, I>(&self, rows: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let table = build_title_table(rows);
        let mut prompt = String::with_capacity(self.preamble.len() + table.len() + 1);
        prompt.push_str(&self.preamble);
        if !self.preamble.is_empty() && !self.preamble.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str(&table);
        prompt
    }

    pub fn build_for_batch(&self, table: &ProspectTable, batch: &Batch<'_, ProspectRecord>) -> String {
        self.build(batch.records.iter().map(|r| (table.id_of(r), table.title_of(r))))
    }
}
