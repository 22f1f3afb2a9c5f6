//=========================================================================
// Arrival Schedule
//=========================================================================
//
// Groups of vehicles released one after another. Each group has a size,
// a probability of heading north, and a pause before the next group.
//
// Sources:
//   "COUNT:PROB:DELAY" strings  → VehicleGroup::from_str (CLI)
//   interactive prompts         → Schedule::read_interactive (stdin)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::{BridgeError, VehicleId};

//=== VehicleGroup ========================================================

/// One batch of vehicles released together.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleGroup {
    /// Number of vehicles in the group.
    pub vehicles: usize,
    /// Probability in `[0, 1]` that a vehicle heads north.
    pub north_probability: f64,
    /// Pause after releasing this group, before the next one.
    pub delay: Duration,
}

impl VehicleGroup {
    /// Creates a validated group.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidSchedule`] if the probability is outside
    /// `[0, 1]` or the delay is negative, not finite, or too large for a
    /// [`Duration`].
    pub fn new(vehicles: usize, north_probability: f64, delay_secs: f64) -> Result<Self, BridgeError> {
        if !(0.0..=1.0).contains(&north_probability) {
            return Err(BridgeError::InvalidSchedule(format!(
                "northbound probability must be within [0, 1], got {}",
                north_probability
            )));
        }
        let delay = Duration::try_from_secs_f64(delay_secs).map_err(|_| {
            BridgeError::InvalidSchedule(format!(
                "group delay must be a non-negative number of seconds, got {}",
                delay_secs
            ))
        })?;

        Ok(Self {
            vehicles,
            north_probability,
            delay,
        })
    }
}

impl FromStr for VehicleGroup {
    type Err = BridgeError;

    /// Parses `COUNT:PROB:DELAY`, e.g. `10:0.7:2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').map(str::trim).collect();
        let [count, probability, delay] = fields.as_slice() else {
            return Err(BridgeError::InvalidSchedule(format!(
                "expected COUNT:PROB:DELAY, got '{}'",
                s
            )));
        };

        Self::new(
            parse_field(count, "vehicle count")?,
            parse_field(probability, "northbound probability")?,
            parse_field(delay, "delay")?,
        )
    }
}

fn parse_field<T: FromStr>(raw: &str, what: &str) -> Result<T, BridgeError> {
    raw.parse()
        .map_err(|_| BridgeError::InvalidSchedule(format!("invalid {}: '{}'", what, raw)))
}

//=== Schedule ============================================================

/// Ordered list of vehicle groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    groups: Vec<VehicleGroup>,
}

impl Schedule {
    /// # Errors
    ///
    /// [`BridgeError::InvalidSchedule`] if `groups` is empty or the groups
    /// hold more vehicles than ids can be handed out for.
    pub fn new(groups: Vec<VehicleGroup>) -> Result<Self, BridgeError> {
        if groups.is_empty() {
            return Err(BridgeError::InvalidSchedule(
                "schedule needs at least one group".into(),
            ));
        }

        let total = groups
            .iter()
            .try_fold(0usize, |total, group| total.checked_add(group.vehicles))
            .filter(|&total| VehicleId::try_from(total).map_or(false, |total| total < VehicleId::MAX));
        if total.is_none() {
            return Err(BridgeError::InvalidSchedule(format!(
                "schedule holds more than {} vehicles",
                VehicleId::MAX - 1
            )));
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[VehicleGroup] {
        &self.groups
    }

    /// Vehicles across all groups; always below [`VehicleId::MAX`].
    pub fn total_vehicles(&self) -> usize {
        self.groups.iter().map(|g| g.vehicles).sum()
    }

    /// Prompts for a schedule on `output` and reads answers from `input`.
    ///
    /// Asks for the number of groups, then for each group its vehicle
    /// count, northbound probability and delay in seconds.
    pub fn read_interactive<R: BufRead, W: Write>(input: R, mut output: W) -> Result<Self, BridgeError> {
        let mut lines = input.lines();
        let mut ask = |prompt: String| -> Result<String, BridgeError> {
            write!(output, "{}", prompt)?;
            output.flush()?;
            match lines.next() {
                Some(line) => Ok(line?.trim().to_string()),
                None => Err(BridgeError::InvalidSchedule(
                    "input ended before the schedule was complete".into(),
                )),
            }
        };

        let count: usize = parse_field(&ask("Number of groups: ".into())?, "group count")?;
        let mut groups = Vec::new();

        for index in 1..=count {
            let vehicles = parse_field(
                &ask(format!("Vehicles in group {}: ", index))?,
                "vehicle count",
            )?;
            let probability = parse_field(
                &ask(format!("Northbound probability for group {} (0.0 to 1.0): ", index))?,
                "northbound probability",
            )?;
            let delay = parse_field(
                &ask(format!("Delay after group {} in seconds: ", index))?,
                "delay",
            )?;
            groups.push(VehicleGroup::new(vehicles, probability, delay)?);
        }

        Self::new(groups)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_group_spec() {
        let group: VehicleGroup = "10:0.7:2".parse().unwrap();
        assert_eq!(group.vehicles, 10);
        assert_eq!(group.north_probability, 0.7);
        assert_eq!(group.delay, Duration::from_secs(2));
    }

    #[test]
    fn parses_fractional_delay_with_spaces() {
        let group: VehicleGroup = " 3 : 1 : 0.5 ".parse().unwrap();
        assert_eq!(group.vehicles, 3);
        assert_eq!(group.delay, Duration::from_millis(500));
    }

    #[test]
    fn rejects_malformed_specs() {
        for spec in ["", "5", "5:0.5", "5:0.5:1:9", "x:0.5:1", "5:abc:1", "-1:0.5:1"] {
            assert!(
                matches!(spec.parse::<VehicleGroup>(), Err(BridgeError::InvalidSchedule(_))),
                "'{}' should be rejected",
                spec
            );
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(VehicleGroup::new(1, 1.5, 0.0).is_err());
        assert!(VehicleGroup::new(1, -0.1, 0.0).is_err());
        assert!(VehicleGroup::new(1, 0.5, -1.0).is_err());
        assert!(VehicleGroup::new(1, 0.5, f64::NAN).is_err());
    }

    #[test]
    fn rejects_delay_beyond_duration_range() {
        assert!(matches!(
            "1:0.5:1e20".parse::<VehicleGroup>(),
            Err(BridgeError::InvalidSchedule(_))
        ));
        assert!(VehicleGroup::new(1, 0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_schedules_with_too_many_vehicles() {
        let huge = VehicleGroup {
            vehicles: usize::MAX,
            north_probability: 0.5,
            delay: Duration::ZERO,
        };
        let one = VehicleGroup::new(1, 0.5, 0.0).unwrap();

        assert!(matches!(
            Schedule::new(vec![huge, one.clone()]),
            Err(BridgeError::InvalidSchedule(_))
        ));

        let at_limit = VehicleGroup { vehicles: (VehicleId::MAX - 1) as usize, ..one.clone() };
        assert!(Schedule::new(vec![at_limit.clone()]).is_ok());
        assert!(Schedule::new(vec![at_limit, one]).is_err());
    }

    #[test]
    fn huge_interactive_group_count_runs_out_of_input() {
        let input = Cursor::new("18446744073709551615\n");
        let result = Schedule::read_interactive(input, Vec::new());
        assert!(matches!(result, Err(BridgeError::InvalidSchedule(_))));
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert!(Schedule::new(Vec::new()).is_err());
    }

    #[test]
    fn counts_vehicles_across_groups() {
        let schedule = Schedule::new(vec![
            VehicleGroup::new(3, 0.5, 0.0).unwrap(),
            VehicleGroup::new(4, 1.0, 1.0).unwrap(),
        ])
        .unwrap();
        assert_eq!(schedule.total_vehicles(), 7);
    }

    #[test]
    fn reads_schedule_interactively() {
        let input = Cursor::new("2\n5\n0.7\n1\n3\n0.2\n0\n");
        let mut prompts = Vec::new();

        let schedule = Schedule::read_interactive(input, &mut prompts).unwrap();

        assert_eq!(schedule.groups().len(), 2);
        assert_eq!(schedule.groups()[0], VehicleGroup::new(5, 0.7, 1.0).unwrap());
        assert_eq!(schedule.groups()[1], VehicleGroup::new(3, 0.2, 0.0).unwrap());

        let prompts = String::from_utf8(prompts).unwrap();
        assert!(prompts.starts_with("Number of groups: "));
        assert!(prompts.contains("Vehicles in group 2: "));
    }

    #[test]
    fn truncated_interactive_input_is_an_error() {
        let input = Cursor::new("1\n5\n");
        let result = Schedule::read_interactive(input, Vec::new());
        assert!(matches!(result, Err(BridgeError::InvalidSchedule(_))));
    }
}
