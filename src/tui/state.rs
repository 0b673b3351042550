use crate::form::ContactForm;
use crate::model::SubmitOutcome;

/// Focusable rows of the form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    Message,
    Privacy,
    Submit,
}

impl Field {
    const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Message,
        Field::Privacy,
        Field::Submit,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Message => "Message",
            Field::Privacy => "Privacy",
            Field::Submit => "Submit",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::Name | Field::Email | Field::Phone | Field::Message
        )
    }

    /// The text buffer behind a text field.
    pub fn buffer(self, form: &mut ContactForm) -> Option<&mut String> {
        match self {
            Field::Name => Some(&mut form.name),
            Field::Email => Some(&mut form.email),
            Field::Phone => Some(&mut form.phone),
            Field::Message => Some(&mut form.message),
            Field::Privacy | Field::Submit => None,
        }
    }
}

pub struct UiState {
    pub focus: Field,
    pub show_help: bool,
    pub info: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Field::Name,
            show_help: false,
            info: "Fill in the form and press Enter on the button (or Ctrl-S) to send.".into(),
        }
    }
}

impl UiState {
    pub fn record_outcome(&mut self, outcome: &SubmitOutcome) {
        self.info = match outcome {
            SubmitOutcome::ConsentRequired => "Not sent: accept the privacy policy first.".into(),
            SubmitOutcome::Sent { status, .. } => format!("Delivered (relay answered {status})."),
            SubmitOutcome::Failed { .. } => "Not delivered. Your input was kept; try again.".into(),
        };
    }
}
