use serde::Serialize;
use std::thread;
use std::time::Duration;

pub const BREATHING_TIMER_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub title: &'static str,
    pub url: &'static str,
}

pub const GUIDED_MEDITATIONS: &[ResourceLink] = &[
    ResourceLink {
        title: "5-Minute",
        url: "https://www.youtube.com/watch?v=inpok4MKVLM",
    },
    ResourceLink {
        title: "Body Scan",
        url: "https://www.youtube.com/watch?v=IHjvM-BLhzU",
    },
    ResourceLink {
        title: "Sleep Aid",
        url: "https://www.youtube.com/watch?v=aEqlQvczMJQ",
    },
];

pub const HELPFUL_RESOURCES: &[ResourceLink] = &[
    ResourceLink {
        title: "Mental Health Hotlines",
        url: "https://www.vandrevalafoundation.com/free-counseling",
    },
    ResourceLink {
        title: "Crisis Text Line",
        url: "https://www.crisistextline.org/",
    },
    ResourceLink {
        title: "Mindfulness Guide",
        url: "https://www.mindful.org/meditation/mindfulness-getting-started/",
    },
];

/// 4-7-8 breathing: inhale, hold, exhale.
pub const BREATHING_STEPS: &[&str] = &[
    "Inhale through nose (4 sec)",
    "Hold breath (7 sec)",
    "Exhale mouth (8 sec)",
];

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Count down from `total_secs` to zero, calling `tick` with the remaining
/// time as `MM:SS` once per `step`.
pub fn run_countdown(total_secs: u64, step: Duration, mut tick: impl FnMut(&str)) {
    for remaining in (0..=total_secs).rev() {
        tick(&format_clock(remaining));
        if remaining > 0 && !step.is_zero() {
            thread::sleep(step);
        }
    }
}
