use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ContextError;

/// Which of the two visual layouts a schedule is printed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum TemplateType {
    /// Grid of exercises followed by a blank weight-tracking grid for each day.
    #[default]
    Standard,
    /// One row per exercise with a column of targets for every week.
    Athlete,
}

impl From<String> for TemplateType {
    fn from(value: String) -> Self {
        match value.trim() {
            // `profghizztemplate` is the identifier older schedules were saved with
            "athlete" | "profghizztemplate" => TemplateType::Athlete,
            _ => TemplateType::Standard,
        }
    }
}

impl From<TemplateType> for &'static str {
    fn from(value: TemplateType) -> Self {
        match value {
            TemplateType::Standard => "standard",
            TemplateType::Athlete => "athlete",
        }
    }
}

/// The workout plan being exported. It is read once per render and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    #[serde(alias = "stato", deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(alias = "livello", deserialize_with = "lenient_optional_text")]
    pub level: Option<String>,
    #[serde(alias = "durata", deserialize_with = "lenient_optional_text")]
    pub duration_label: Option<String>,
    #[serde(alias = "dataInizio", deserialize_with = "lenient_text")]
    pub start_date: String,
    #[serde(alias = "orario", deserialize_with = "lenient_text")]
    pub time_of_day: String,
    #[serde(deserialize_with = "lenient_template_type")]
    pub template_type: TemplateType,
    #[serde(alias = "giorni", deserialize_with = "lenient_list")]
    pub days: Vec<Day>,
    /// Notes stored on the schedule itself, used when the client carries none.
    #[serde(deserialize_with = "lenient_optional_text")]
    pub personal_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Day {
    #[serde(alias = "nome", deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(alias = "esercizi", deserialize_with = "lenient_list")]
    pub exercises: Vec<ScheduleExercise>,
    #[serde(alias = "settimane", skip_serializing_if = "Option::is_none")]
    pub weeks: Option<Vec<Week>>,
}

impl Day {
    /// The explicit week list of the day, or `None` when it is absent or empty.
    pub fn declared_weeks(&self) -> Option<&[Week]> {
        self.weeks
            .as_deref()
            .filter(|declared_weeks| !declared_weeks.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Week {
    #[serde(alias = "nome", deserialize_with = "lenient_text")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleExercise {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(alias = "nome", deserialize_with = "lenient_text")]
    pub name: String,
    /// A data URI, a file path or a URL.
    #[serde(alias = "image", deserialize_with = "lenient_optional_text")]
    pub image_data: Option<String>,
    #[serde(alias = "categoria", deserialize_with = "lenient_optional_text")]
    pub category: Option<String>,
    #[serde(alias = "didascalia", deserialize_with = "lenient_optional_text")]
    pub caption: Option<String>,
    #[serde(alias = "settimaneValori", deserialize_with = "lenient_list")]
    pub per_week_values: Vec<WeekValues>,
}

impl ScheduleExercise {
    /// The values of the week column at `week_index`, if the exercise carries them.
    pub fn week_values(&self, week_index: usize) -> Option<&WeekValues> {
        self.per_week_values.get(week_index)
    }
}

/// Targets of one exercise for one week. Non-numeric inputs are read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeekValues {
    #[serde(alias = "serie", deserialize_with = "lenient_number")]
    pub sets: f64,
    #[serde(alias = "ripetizioni", deserialize_with = "lenient_number")]
    pub reps: f64,
    #[serde(alias = "minuti", deserialize_with = "lenient_number")]
    pub minutes: f64,
    #[serde(alias = "secondi", deserialize_with = "lenient_number")]
    pub seconds: f64,
    #[serde(alias = "caricoKg", deserialize_with = "lenient_number")]
    pub load_kg: f64,
    #[serde(deserialize_with = "lenient_text")]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub personal_notes: Option<String>,
}

impl Client {
    /// The freeform notes printed at the end of the schedule: the client's own notes first,
    /// then the ones saved on the schedule. Blank notes count as missing.
    pub fn notes_for<'a>(&'a self, schedule: &'a Schedule) -> Option<&'a str> {
        [&self.personal_notes, &schedule.personal_notes]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|notes| !notes.trim().is_empty())
    }
}

impl Schedule {
    pub fn from_path(schedule_path: &Path) -> Result<Schedule, ContextError> {
        read_json(schedule_path, "schedule")
    }
}

impl Client {
    pub fn from_path(client_path: &Path) -> Result<Client, ContextError> {
        read_json(client_path, "client")
    }
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    description: &str,
) -> Result<T, ContextError> {
    let file_content = std::fs::read_to_string(path).map_err(|error| {
        ContextError::with_error(format!("Unable to read the {description} {:?}", path), &error)
    })?;
    serde_json::from_str(&file_content).map_err(|error| {
        ContextError::with_error(format!("Unable to parse the {description} {:?}", path), &error)
    })
}

// The collaborators saving the schedules are loosely typed: numbers may arrive as strings, text
// as numbers and any field as `null`. The following helpers read such values the forgiving way.

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        Some(serde_json::Value::Bool(true)) => 1.0,
        _ => 0.0,
    };

    Ok(if number.is_finite() { number } else { 0.0 })
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_optional_text(deserializer).map(Option::unwrap_or_default)
}

fn lenient_template_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<TemplateType, D::Error> {
    lenient_text(deserializer).map(TemplateType::from)
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
