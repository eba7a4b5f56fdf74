use crate::event::{WebhookEvent, ISSUES, ISSUE_COMMENT};

/// What kind of reply an event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    /// The trigger label was just added: analyse the issue from scratch.
    Fresh,
    /// Someone commented on a labelled issue: continue the discussion.
    Continuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classification {
    Process(Case),
    Ignore(String),
}

pub(crate) const EVENT_IGNORED: &str = "Event ignored";

pub(crate) fn classify(event: &WebhookEvent, trigger_label: &str) -> Classification {
    match (&event.event_type[..], &event.action[..]) {
        (ISSUES, "labeled") => match event.label.as_deref() {
            Some(label) if label == trigger_label => Classification::Process(Case::Fresh),
            label => Classification::Ignore(format!(
                "Label ignored: {}",
                label.unwrap_or("<none>")
            )),
        },
        (ISSUE_COMMENT, "created") => {
            if event.issue_labels.iter().any(|l| l == trigger_label) {
                Classification::Process(Case::Continuation)
            } else {
                Classification::Ignore(format!("Issue not marked for {trigger_label}"))
            }
        }
        _ => Classification::Ignore(EVENT_IGNORED.to_owned()),
    }
}
