use chrono::{DateTime, Utc};

use crate::models::Job;

pub const REMINDER_TITLE: &str = "Interview Reminder";
/// Lookahead window for interview notifications, in hours.
pub const REMINDER_LEAD_HOURS: f64 = 24.0;
/// Interviews closer than this many days get the "Upcoming" badge.
pub const UPCOMING_WINDOW_DAYS: f64 = 2.0;

/// Platform notification capability. `request_permission` runs once at
/// dashboard mount; `is_granted` is queried before every reminder; `show`
/// is fire-and-forget.
pub trait Notifier {
    fn request_permission(&self);
    fn is_granted(&self) -> bool;
    fn show(&self, title: &str, body: &str);
}

/// Writes reminders to stderr. Permission is always granted.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn request_permission(&self) {}

    fn is_granted(&self) -> bool {
        true
    }

    fn show(&self, title: &str, body: &str) {
        eprintln!("[{title}] {body}");
    }
}

/// Fires a reminder when the job's interview falls within the lead window
/// and notification permission is granted. Carries no "already notified"
/// state: every evaluation inside the window notifies again.
pub fn check_and_notify(job: &Job, now: DateTime<Utc>, notifier: &dyn Notifier) {
    let Some(interview) = job.interview_date else {
        return;
    };
    let hours_until = (interview - now).num_seconds() as f64 / 3600.0;
    if (0.0..=REMINDER_LEAD_HOURS).contains(&hours_until) && notifier.is_granted() {
        let body = format!(
            "{} at {} is scheduled within 24 hours.",
            job.position, job.company
        );
        notifier.show(REMINDER_TITLE, &body);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Upcoming,
    None,
}

/// Badge for the job list: "Upcoming" when the interview is less than two
/// days ahead of `now`. Past interviews never get a badge.
pub fn badge_state(job: &Job, now: DateTime<Utc>) -> Badge {
    let Some(interview) = job.interview_date else {
        return Badge::None;
    };
    let diff_days = (interview - now).num_seconds() as f64 / 86_400.0;
    if (0.0..UPCOMING_WINDOW_DAYS).contains(&diff_days) {
        Badge::Upcoming
    } else {
        Badge::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, JobType};
    use chrono::Duration;
    use std::cell::RefCell;

    struct RecordingNotifier {
        granted: bool,
        shown: RefCell<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new(granted: bool) -> Self {
            Self {
                granted,
                shown: RefCell::new(Vec::new()),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn request_permission(&self) {}

        fn is_granted(&self) -> bool {
            self.granted
        }

        fn show(&self, title: &str, body: &str) {
            self.shown
                .borrow_mut()
                .push((title.to_string(), body.to_string()));
        }
    }

    fn job_with_interview(offset: Option<Duration>, now: DateTime<Utc>) -> Job {
        Job {
            id: "1".to_string(),
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            status: JobStatus::Interview,
            job_type: JobType::Remote,
            interview_date: offset.map(|o| now + o),
        }
    }

    #[test]
    fn test_notifies_inside_the_24h_window_only() {
        let now = Utc::now();
        let notifier = RecordingNotifier::new(true);

        let soon = job_with_interview(Some(Duration::hours(3)), now);
        let later = job_with_interview(Some(Duration::hours(30)), now);
        check_and_notify(&soon, now, &notifier);
        check_and_notify(&later, now, &notifier);

        let shown = notifier.shown.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, REMINDER_TITLE);
        assert!(shown[0].1.contains("Engineer at Acme"));
    }

    #[test]
    fn test_past_interviews_never_notify() {
        let now = Utc::now();
        let notifier = RecordingNotifier::new(true);
        let past = job_with_interview(Some(Duration::hours(-1)), now);
        check_and_notify(&past, now, &notifier);
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_no_interview_date_is_a_noop() {
        let now = Utc::now();
        let notifier = RecordingNotifier::new(true);
        let none = job_with_interview(None, now);
        check_and_notify(&none, now, &notifier);
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_ungranted_permission_suppresses_the_reminder() {
        let now = Utc::now();
        let notifier = RecordingNotifier::new(false);
        let soon = job_with_interview(Some(Duration::hours(3)), now);
        check_and_notify(&soon, now, &notifier);
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_badge_boundaries() {
        let now = Utc::now();

        let today = job_with_interview(Some(Duration::zero()), now);
        assert_eq!(badge_state(&today, now), Badge::Upcoming);

        let tomorrow = job_with_interview(Some(Duration::hours(47)), now);
        assert_eq!(badge_state(&tomorrow, now), Badge::Upcoming);

        let two_days = job_with_interview(Some(Duration::days(2)), now);
        assert_eq!(badge_state(&two_days, now), Badge::None);

        let past = job_with_interview(Some(Duration::hours(-12)), now);
        assert_eq!(badge_state(&past, now), Badge::None);

        let unscheduled = job_with_interview(None, now);
        assert_eq!(badge_state(&unscheduled, now), Badge::None);
    }
}
