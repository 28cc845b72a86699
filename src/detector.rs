use heapless::Vec;

pub const SINGLE_CLAP_SAMPLES: u16 = 5; // Cooldown after a clap - one clap spans several samples
pub const SEQUENCE_MIN: u16 = 1;
pub const SEQUENCE_MAX: u16 = 320; // Longest sequence also fills the duration bar

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorEvent {
    SequenceStarted { length: u16 },
    Clap { count: u16 },
    SequenceEnded { claps: u16 },
}

impl std::fmt::Display for DetectorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::SequenceStarted { length } => write!(f, "Sequence started: {length} samples"),
            Self::Clap { count } => write!(f, "Claps: {count}"),
            Self::SequenceEnded { claps } => write!(f, "Sequence ended: {claps} claps"),
        }
    }
}

// At most start + clap + end in a single cycle
pub type Events = Vec<DetectorEvent, 3>;

/// Clap detector and sequence timer.
///
/// Both countdowns are measured in samples. Each call to [`Detector::update`]
/// applies the cooldown gate, then transient evaluation, then the sequence
/// countdown, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detector {
    cooldown: u16,
    remaining: u16,
    claps: u16,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: u16, threshold: u32, sequence_length: u16) -> Events {
        let mut events = Events::new();

        if self.cooldown > 0 {
            self.cooldown -= 1;
        } else if sample as u32 > threshold {
            self.cooldown = SINGLE_CLAP_SAMPLES;
            if self.remaining == 0 {
                self.remaining = sequence_length.clamp(SEQUENCE_MIN, SEQUENCE_MAX);
                self.claps = 0;
                events
                    .push(DetectorEvent::SequenceStarted {
                        length: self.remaining,
                    })
                    .ok();
            }
            self.claps += 1;
            events
                .push(DetectorEvent::Clap { count: self.claps })
                .ok();
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                events
                    .push(DetectorEvent::SequenceEnded { claps: self.claps })
                    .ok();
                self.claps = 0;
            }
        }

        events
    }

    pub fn cooldown_remaining(&self) -> u16 {
        self.cooldown
    }

    pub fn sequence_remaining(&self) -> u16 {
        self.remaining
    }

    pub fn claps_in_sequence(&self) -> u16 {
        self.claps
    }

    pub fn sequence_active(&self) -> bool {
        self.remaining > 0
    }
}
