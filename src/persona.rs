use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketing personas a job title can be classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    Executive,
    #[serde(rename = "IT Manager")]
    ItManager,
    Architect,
    Developer,
    #[serde(rename = "Not a target")]
    NotATarget,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::Executive,
        Persona::ItManager,
        Persona::Architect,
        Persona::Developer,
        Persona::NotATarget,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Persona::Executive => "Executive",
            Persona::ItManager => "IT Manager",
            Persona::Architect => "Architect",
            Persona::Developer => "Developer",
            Persona::NotATarget => "Not a target",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Persona::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown persona '{}'", wanted))
    }
}

/// Self-reported model certainty, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Certainty(f64);

impl Certainty {
    pub fn new(value: f64) -> Result<Self, String> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("certainty {} is outside [0, 1]", value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Certainty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Certainty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| format!("certainty '{}' is not a number", s.trim()))?;
        Certainty::new(value)
    }
}

/// One row returned by the completion service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub prospect_id: String,
    pub job_title: String,
    pub persona: Persona,
    pub certainty: Certainty,
}
