use crate::detector::{SEQUENCE_MAX, SEQUENCE_MIN};
use crate::history::ADC_MAX;

/// The two live analog inputs. Reads are instantaneous and return raw
/// 12-bit values.
pub trait SampleSource {
    fn read_microphone(&mut self) -> anyhow::Result<u16>;
    fn read_position(&mut self) -> anyhow::Result<u16>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read_microphone(&mut self) -> anyhow::Result<u16> {
        (**self).read_microphone()
    }
    fn read_position(&mut self) -> anyhow::Result<u16> {
        (**self).read_position()
    }
}

/// Linear map of the angle sensor onto the sequence length range.
pub fn sequence_length(position: u16) -> u16 {
    let position = position.min(ADC_MAX) as u32;
    let span = (SEQUENCE_MAX - SEQUENCE_MIN) as u32;
    (position * span / ADC_MAX as u32) as u16 + SEQUENCE_MIN
}

#[cfg(target_os = "espidf")]
pub use esp::AdcInputs;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::adc::attenuation::DB_11;
    use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
    use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
    use esp_idf_hal::adc::ADC1;
    use esp_idf_hal::gpio::{Gpio34, Gpio36};

    use super::SampleSource;

    type Adc<'d> = &'d AdcDriver<'d, ADC1>;

    /// Microphone (GPIO34) and angle sensor (GPIO36) on ADC1, oneshot mode.
    pub struct AdcInputs<'d> {
        adc: Adc<'d>,
        microphone: AdcChannelDriver<'d, Gpio34, Adc<'d>>,
        position: AdcChannelDriver<'d, Gpio36, Adc<'d>>,
    }

    impl<'d> AdcInputs<'d> {
        pub fn new(adc: Adc<'d>, microphone: Gpio34, position: Gpio36) -> anyhow::Result<Self> {
            let config = AdcChannelConfig {
                attenuation: DB_11,
                ..Default::default()
            };
            let microphone = AdcChannelDriver::new(adc, microphone, &config)?;
            let position = AdcChannelDriver::new(adc, position, &config)?;
            log::info!("=== ADC1 oneshot: microphone GPIO34 / position GPIO36 / 11dB");
            Ok(Self {
                adc,
                microphone,
                position,
            })
        }
    }

    impl SampleSource for AdcInputs<'_> {
        fn read_microphone(&mut self) -> anyhow::Result<u16> {
            Ok(self.adc.read_raw(&mut self.microphone)?)
        }

        fn read_position(&mut self) -> anyhow::Result<u16> {
            Ok(self.adc.read_raw(&mut self.position)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_maps_onto_sequence_bounds() {
        assert_eq!(sequence_length(0), SEQUENCE_MIN);
        assert_eq!(sequence_length(ADC_MAX), SEQUENCE_MAX);
        assert_eq!(sequence_length(u16::MAX), SEQUENCE_MAX);
        assert_eq!(sequence_length(2048), 160);
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut prev = 0;
        for p in (0..=ADC_MAX).step_by(7) {
            let len = sequence_length(p);
            assert!(len >= prev);
            prev = len;
        }
    }
}
