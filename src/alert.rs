//! Alert messages for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` div that [crate::html::base]
//! places on every page, via the htmx response-targets extension.

use maud::{Markup, html};

/// Alert message types for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Success,
    Error,
}

/// Renders alert messages with appropriate styling.
#[derive(Debug, Clone)]
pub struct AlertTemplate<'a> {
    pub alert_type: AlertType,
    pub message: &'a str,
    pub details: &'a str,
}

impl<'a> AlertTemplate<'a> {
    /// Create a new success alert.
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert.
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    /// Render the alert as HTML.
    pub fn into_markup(self) -> Markup {
        let (container_style, icon) = match self.alert_type {
            AlertType::Success => (
                "flex items-start gap-3 p-4 text-sm text-green-800 rounded-lg \
                bg-green-50 dark:bg-gray-800 dark:text-green-400 border \
                border-green-300 dark:border-green-800 shadow-lg",
                "✓",
            ),
            AlertType::Error => (
                "flex items-start gap-3 p-4 text-sm text-red-800 rounded-lg \
                bg-red-50 dark:bg-gray-800 dark:text-red-400 border \
                border-red-300 dark:border-red-800 shadow-lg",
                "!",
            ),
        };

        html! {
            div role="alert" class=(container_style)
            {
                span aria-hidden="true" class="font-bold" { (icon) }

                div class="flex-1"
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty()
                    {
                        p class="mt-1" { (self.details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold cursor-pointer"
                    onclick="const c = document.getElementById('alert-container'); c.classList.add('hidden'); c.innerHTML = '';"
                {
                    "✕"
                }
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use super::AlertTemplate;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertTemplate::error("Could not save", "Try again later.").into_markup();

        let html = markup.into_string();
        assert!(html.contains("Could not save"));
        assert!(html.contains("Try again later."));
    }

    #[test]
    fn error_alert_without_details_omits_details_paragraph() {
        let markup = AlertTemplate::error("Could not save", "").into_markup();

        let html = markup.into_string();
        assert!(html.contains("Could not save"));
        assert_eq!(html.matches("<p").count(), 1);
    }
}
