// Hall sensor decoding for BLDC shaft position
// Maps the 3-bit Hall state to one of six sectors per electrical revolution
// and counts electrical revolutions to recover the mechanical angle

use core::f32::consts::TAU;

use crate::angle;
use crate::config::ConfigError;
use crate::sensor::RawAngleSource;

/// Marker for Hall states that can not occur on a healthy sensor
const INVALID_SECTOR: u8 = 255;

/// Number of Hall sectors per electrical revolution
const SECTORS: u32 = 6;

/// Hall state lookup table
/// Maps raw hall state (1-6) to sector index (0-5)
/// Valid transition sequence: 1 -> 3 -> 2 -> 6 -> 4 -> 5 -> 1 (CW rotation)
/// Raw state:      [0,       1, 2, 3, 4, 5, 6, 7]
/// Sector index:   [invalid, 0, 2, 1, 4, 5, 3, invalid]
const HALL_STATE_TABLE: [u8; 8] = [
    INVALID_SECTOR, // 0b000
    0,              // 0b001
    2,              // 0b010
    1,              // 0b011
    4,              // 0b100
    5,              // 0b101
    3,              // 0b110
    INVALID_SECTOR, // 0b111
];

/// Access to the three Hall inputs
pub trait HallInputs {
    /// Current Hall state, bit 0 = A, bit 1 = B, bit 2 = C
    fn read_state(&mut self) -> u8;
}

impl<F: FnMut() -> u8> HallInputs for F {
    fn read_state(&mut self) -> u8 {
        self()
    }
}

/// Hall sensor providing a coarse mechanical angle
pub struct HallSensor<H> {
    inputs: H,
    /// Previous sector (0-5), INVALID_SECTOR before the first valid reading
    prev_sector: u8,
    /// Sector base of the current electrical revolution (steps of 6)
    sector_base: u32,
    /// Sector count of one mechanical revolution (pole_pairs * 6)
    sector_max: u32,
    /// Mechanical angle per sector = TAU / sector_max
    angle_per_sector: f32,
    /// Last reported mechanical angle [rad]
    mechanical_angle: f32,
    pole_pairs: u8,
    invalid_count: u32,
}

impl<H: HallInputs> HallSensor<H> {
    /// Create a new Hall sensor
    ///
    /// # Arguments
    /// * `inputs` - Hall input reader
    /// * `pole_pairs` - Number of pole pairs in the motor
    pub fn new(inputs: H, pole_pairs: u8) -> Result<Self, ConfigError> {
        if pole_pairs == 0 {
            return Err(ConfigError::ZeroPolePairs);
        }
        let sector_max = pole_pairs as u32 * SECTORS;
        Ok(Self {
            inputs,
            prev_sector: INVALID_SECTOR,
            sector_base: 0,
            sector_max,
            angle_per_sector: TAU / sector_max as f32,
            mechanical_angle: 0.0,
            pole_pairs,
            invalid_count: 0,
        })
    }

    /// Check if a hall state is valid (1-6)
    pub fn is_valid_state(state: u8) -> bool {
        (1..=6).contains(&state)
    }

    /// Decode one Hall reading and return the mechanical angle [rad]
    fn decode(&mut self, raw_state: u8) -> f32 {
        let sector = match HALL_STATE_TABLE.get(raw_state as usize) {
            Some(&s) if s != INVALID_SECTOR => s,
            _ => {
                self.invalid_count = self.invalid_count.saturating_add(1);
                warn!(
                    "Invalid hall state: {} (total {})",
                    raw_state, self.invalid_count
                );
                return self.mechanical_angle;
            }
        };

        if self.prev_sector != INVALID_SECTOR && sector != self.prev_sector {
            // Sector 0 after 5: one electrical revolution forward
            if sector == 0 && self.prev_sector == 5 {
                self.sector_base += SECTORS;
                if self.sector_base >= self.sector_max {
                    self.sector_base = 0;
                }
            }
            // Sector 5 after 0: one electrical revolution backward
            else if sector == 5 && self.prev_sector == 0 {
                if self.sector_base < SECTORS {
                    self.sector_base = self.sector_max - SECTORS;
                } else {
                    self.sector_base -= SECTORS;
                }
            }
            trace!(
                "Hall edge: sector {} -> {}, base={}",
                self.prev_sector,
                sector,
                self.sector_base
            );
        }
        self.prev_sector = sector;

        let index = self.sector_base + sector as u32;
        self.mechanical_angle = angle::normalize(index as f32 * self.angle_per_sector);
        self.mechanical_angle
    }

    /// Electrical angle [rad] of the last reading, before any offset
    pub fn electrical_angle(&self) -> f32 {
        angle::normalize(self.mechanical_angle * self.pole_pairs as f32)
    }

    pub fn pole_pairs(&self) -> u8 {
        self.pole_pairs
    }

    /// Number of invalid Hall states seen so far
    pub fn invalid_count(&self) -> u32 {
        self.invalid_count
    }

    /// Forget the electrical revolution count; the next reading restarts at
    /// the first electrical revolution
    pub fn reset(&mut self) {
        self.prev_sector = INVALID_SECTOR;
        self.sector_base = 0;
        self.mechanical_angle = 0.0;
    }

    pub fn inputs_mut(&mut self) -> &mut H {
        &mut self.inputs
    }
}

impl<H: HallInputs> RawAngleSource for HallSensor<H> {
    fn read_raw_angle(&mut self) -> f32 {
        let state = self.inputs.read_state();
        self.decode(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// CW state sequence
    const CW: [u8; 6] = [1, 3, 2, 6, 4, 5];

    struct Script {
        states: [u8; 64],
        len: usize,
        pos: usize,
    }

    impl Script {
        fn new(seq: &[u8]) -> Self {
            let mut states = [0; 64];
            states[..seq.len()].copy_from_slice(seq);
            Self {
                states,
                len: seq.len(),
                pos: 0,
            }
        }
    }

    impl HallInputs for Script {
        fn read_state(&mut self) -> u8 {
            let s = self.states[self.pos.min(self.len - 1)];
            self.pos += 1;
            s
        }
    }

    #[test]
    fn test_valid_states() {
        assert!(!HallSensor::<Script>::is_valid_state(0));
        assert!(HallSensor::<Script>::is_valid_state(1));
        assert!(HallSensor::<Script>::is_valid_state(6));
        assert!(!HallSensor::<Script>::is_valid_state(7));
    }

    #[test]
    fn test_hall_state_table() {
        assert_eq!(HALL_STATE_TABLE[0], INVALID_SECTOR);
        assert_eq!(HALL_STATE_TABLE[1], 0);
        assert_eq!(HALL_STATE_TABLE[2], 2);
        assert_eq!(HALL_STATE_TABLE[3], 1);
        assert_eq!(HALL_STATE_TABLE[4], 4);
        assert_eq!(HALL_STATE_TABLE[5], 5);
        assert_eq!(HALL_STATE_TABLE[6], 3);
        assert_eq!(HALL_STATE_TABLE[7], INVALID_SECTOR);
    }

    #[test]
    fn test_zero_pole_pairs_rejected() {
        assert!(matches!(
            HallSensor::new(|| 1u8, 0),
            Err(ConfigError::ZeroPolePairs)
        ));
    }

    #[test]
    fn test_forward_sequence() {
        // 2 pole pairs: 12 sectors per mechanical turn, 30 deg each
        let mut seq = [0u8; 13];
        for (i, s) in seq.iter_mut().enumerate() {
            *s = CW[i % 6];
        }
        let mut hall = HallSensor::new(Script::new(&seq), 2).unwrap();
        let step = TAU / 12.0;

        for i in 0..12 {
            let a = hall.read_raw_angle();
            assert!((a - i as f32 * step).abs() < 1e-5, "step {i}: {a}");
        }
        // thirteenth reading closes the mechanical revolution
        assert!(hall.read_raw_angle().abs() < 1e-5);
    }

    #[test]
    fn test_backward_sequence() {
        // state 1 then 5: one sector backward across the electrical seam
        let mut hall = HallSensor::new(Script::new(&[1, 5, 4]), 2).unwrap();
        assert_eq!(hall.read_raw_angle(), 0.0);
        let step = TAU / 12.0;
        assert!((hall.read_raw_angle() - 11.0 * step).abs() < 1e-5);
        assert!((hall.read_raw_angle() - 10.0 * step).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_state_keeps_angle() {
        let mut hall = HallSensor::new(Script::new(&[3, 0, 7, 2]), 1).unwrap();
        let a = hall.read_raw_angle();
        assert_eq!(hall.read_raw_angle(), a);
        assert_eq!(hall.read_raw_angle(), a);
        assert_eq!(hall.invalid_count(), 2);
        assert!(hall.read_raw_angle() > a);
    }

    #[test]
    fn test_electrical_angle() {
        // 6 pole pairs: 10 deg mechanical per sector, 60 deg electrical
        let mut hall = HallSensor::new(Script::new(&[3]), 6).unwrap();
        hall.read_raw_angle();
        let expected_mech = 10.0f32.to_radians();
        assert!((hall.mechanical_angle - expected_mech).abs() < 1e-5);
        assert!((hall.electrical_angle() - 60.0f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut hall = HallSensor::new(Script::new(&[5, 1, 3]), 1).unwrap();
        hall.read_raw_angle();
        hall.read_raw_angle();
        hall.reset();
        assert_eq!(hall.mechanical_angle, 0.0);
        let step = TAU / 6.0;
        assert!((hall.read_raw_angle() - step).abs() < 1e-5);
    }
}
