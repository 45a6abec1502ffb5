//! Poll create/edit form input and its validation.
//!
//! A draft is whatever the admin typed, kept verbatim so a rejected form can be
//! shown again. `validate` is the only way to obtain a `PollPayload`, so every
//! create/update request has passed the checks below before it is sent.

use crate::auth::validate;

use super::types::{Poll, PollPayload, PollType};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const OPTION_MAX: usize = 200;

/// Number of blank option rows offered when a poll has none yet.
const BLANK_ROWS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    pub poll_type: PollType,
    /// Raw option rows, blanks included.
    pub options: Vec<String>,
}

impl PollDraft {
    /// Pre-fill the edit dialog from an existing poll.
    pub fn from_poll(poll: &Poll) -> Self {
        let mut options: Vec<String> = poll.options.iter().map(|o| o.name.clone()).collect();
        if options.is_empty() {
            options = vec![String::new(); BLANK_ROWS];
        }
        Self {
            title: poll.title.clone(),
            description: poll.description().unwrap_or_default().to_string(),
            poll_type: poll.poll_type,
            options,
        }
    }

    /// Build a draft from decoded form pairs.
    ///
    /// Options arrive either as one `options` textarea (one per line, create
    /// form) or as repeated `option` fields (one per row, edit dialog).
    pub fn from_fields(params: &[(String, String)]) -> Self {
        let mut options = Vec::new();
        for (key, value) in params {
            match key.as_str() {
                "options" => options.extend(value.lines().map(str::to_string)),
                "option" => options.push(value.clone()),
                _ => {}
            }
        }
        Self {
            title: field(params, "title").to_string(),
            description: field(params, "description").to_string(),
            poll_type: PollType::from_form(field(params, "poll_type")),
            options,
        }
    }

    /// Trimmed, non-empty option names in row order.
    pub fn option_names(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn add_row(&mut self) {
        self.options.push(String::new());
    }

    /// Remove an option row; out-of-range indexes are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.options.len() {
            self.options.remove(index);
        }
    }

    /// Check the draft and produce the request body, or the first problem
    /// found as a user-facing message.
    pub fn validate(&self) -> Result<PollPayload, String> {
        if self.title.trim().is_empty() {
            return Err("Please enter a title.".to_string());
        }
        if let Some(e) = validate::validate_required(&self.title, "Title", TITLE_MAX) {
            return Err(e);
        }
        if let Some(e) = validate::validate_optional(&self.description, "Description", DESCRIPTION_MAX) {
            return Err(e);
        }

        let options = match self.poll_type {
            PollType::TextResponse => None,
            PollType::MultipleChoice => {
                let names = self.option_names();
                if names.len() < 2 {
                    return Err(
                        "Please enter at least two options for multiple choice polls.".to_string(),
                    );
                }
                if let Some(long) = names.iter().find(|n| n.chars().count() > OPTION_MAX) {
                    return Err(format!(
                        "Option '{}…' must be at most {OPTION_MAX} characters",
                        long.chars().take(20).collect::<String>()
                    ));
                }
                Some(names)
            }
        };

        Ok(PollPayload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            poll_type: self.poll_type,
            options,
        })
    }
}

/// First value submitted for `key`, or "".
pub fn field<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// A vote needs a selected option.
pub fn validate_selection(option_id: &str) -> Result<&str, String> {
    let trimmed = option_id.trim();
    if trimmed.is_empty() {
        return Err("Please select a candidate before voting.".to_string());
    }
    Ok(trimmed)
}

/// A text response needs a non-empty body.
pub fn validate_response_text(text: &str) -> Result<&str, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Please enter your response before submitting.".to_string());
    }
    Ok(trimmed)
}
