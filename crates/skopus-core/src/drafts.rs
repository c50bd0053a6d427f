//! Input records for the copy and contract generators.

use serde::{Deserialize, Serialize};

use crate::validation::{require_filled, FieldId, ValidationError};

/// Voice requested for prospecting copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    #[default]
    Casual,
    Objective,
}

impl Tone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Objective => "objective",
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "formal" => Ok(Self::Formal),
            "casual" => Ok(Self::Casual),
            "objective" | "direto" => Ok(Self::Objective),
            other => Err(format!("unknown tone \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CopyField {
    UserName,
    Niche,
    ContactName,
    LeadProblem,
    Solution,
    Differential,
    Goal,
}

impl FieldId for CopyField {
    fn as_str(&self) -> &'static str {
        match self {
            Self::UserName => "userName",
            Self::Niche => "niche",
            Self::ContactName => "contactName",
            Self::LeadProblem => "leadProblem",
            Self::Solution => "solution",
            Self::Differential => "differential",
            Self::Goal => "goal",
        }
    }
}

/// Campaign parameters for a pair of prospecting messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyInput {
    pub user_name: String,
    pub niche: String,
    pub contact_name: String,
    pub lead_problem: String,
    pub solution: String,
    pub differential: String,
    pub goal: String,
    pub tone: Tone,
}

impl CopyInput {
    /// All text fields are required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming every blank field.
    pub fn validate(&self) -> Result<(), ValidationError<CopyField>> {
        require_filled([
            (CopyField::UserName, self.user_name.as_str()),
            (CopyField::Niche, self.niche.as_str()),
            (CopyField::ContactName, self.contact_name.as_str()),
            (CopyField::LeadProblem, self.lead_problem.as_str()),
            (CopyField::Solution, self.solution.as_str()),
            (CopyField::Differential, self.differential.as_str()),
            (CopyField::Goal, self.goal.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractField {
    ServiceName,
    Value,
    Deadline,
    ProviderName,
    ProviderId,
    ClientName,
    ClientId,
    Location,
    Date,
}

impl FieldId for ContractField {
    fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceName => "serviceName",
            Self::Value => "value",
            Self::Deadline => "deadline",
            Self::ProviderName => "providerName",
            Self::ProviderId => "providerId",
            Self::ClientName => "clientName",
            Self::ClientId => "clientId",
            Self::Location => "location",
            Self::Date => "date",
        }
    }
}

/// Parties, terms and options for a service contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInput {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub provider_name: String,
    /// CPF or CNPJ of the provider.
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_id: String,
    /// Amount in BRL as typed by the user (e.g. `"2.500,00"`).
    #[serde(default)]
    pub value: String,
    /// Delivery deadline in days.
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub location: String,
    /// Signature date, `dd/mm/yyyy`.
    #[serde(default = "today_pt_br")]
    pub date: String,
    #[serde(default = "enabled")]
    pub delay_fine: bool,
    #[serde(default = "enabled")]
    pub default_fine: bool,
    #[serde(default)]
    pub extra_info: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for ContractInput {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            provider_name: String::new(),
            provider_id: String::new(),
            client_name: String::new(),
            client_id: String::new(),
            value: String::new(),
            deadline: String::new(),
            location: String::new(),
            date: today_pt_br(),
            delay_fine: true,
            default_fine: true,
            extra_info: None,
            logo_url: None,
        }
    }
}

impl ContractInput {
    /// Everything except the fines, extras and logo is required.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming every blank field.
    pub fn validate(&self) -> Result<(), ValidationError<ContractField>> {
        require_filled([
            (ContractField::ServiceName, self.service_name.as_str()),
            (ContractField::Value, self.value.as_str()),
            (ContractField::Deadline, self.deadline.as_str()),
            (ContractField::ProviderName, self.provider_name.as_str()),
            (ContractField::ProviderId, self.provider_id.as_str()),
            (ContractField::ClientName, self.client_name.as_str()),
            (ContractField::ClientId, self.client_id.as_str()),
            (ContractField::Location, self.location.as_str()),
            (ContractField::Date, self.date.as_str()),
        ])
    }

    /// Extra clauses, or `None` when blank.
    #[must_use]
    pub fn extra_info(&self) -> Option<&str> {
        self.extra_info
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn today_pt_br() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

const fn enabled() -> bool {
    true
}
