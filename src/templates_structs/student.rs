use askama::Template;

use super::PageContext;

pub struct StudentOption {
    pub id: String,
    pub name: String,
}

/// One poll card of the student list.
pub struct StudentCard {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_text: bool,
    pub kind_label: &'static str,
    pub kind_value: String,
    pub count_label: &'static str,
    pub closes_label: String,
    pub expanded: bool,
    pub toggle_href: String,
    pub toggle_label: &'static str,
    pub voted: bool,
    pub thank_you: &'static str,
    pub options: Vec<StudentOption>,
    pub submit_action: String,
    pub submit_label: &'static str,
}

#[derive(Template)]
#[template(path = "student/index.html")]
pub struct StudentTemplate {
    pub ctx: PageContext,
    /// No username yet: only the capture form is shown.
    pub needs_username: bool,
    pub active_count: usize,
    pub cards: Vec<StudentCard>,
}
