/// One voice command to render: what is spoken, where it lands, and what it should trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub text: &'static str,
    pub filename: &'static str,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        text: "set timer for 2 minutes",
        filename: "test_set_timer_2min.wav",
        description: "Sets a 2-minute timer",
    },
    CommandSpec {
        text: "set timer for 30 seconds",
        filename: "test_set_timer_30sec.wav",
        description: "Sets a 30-second timer",
    },
    CommandSpec {
        text: "set alarm for 7 AM",
        filename: "test_set_alarm_7am.wav",
        description: "Sets alarm for 7:00 AM",
    },
    CommandSpec {
        text: "wake me up at 6 30",
        filename: "test_wake_up_630.wav",
        description: "Sets alarm for 6:30",
    },
    CommandSpec {
        text: "set timer for 5 minutes",
        filename: "test_set_timer_5min.wav",
        description: "Sets a 5-minute timer",
    },
];
