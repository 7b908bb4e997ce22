//! Logical input keys sampled once per frame.

use std::{collections::HashSet, fmt, str::FromStr};

/// A logical key recognised by the motion rules and the camera controller.
///
/// Front ends map physical keys onto these; the core never sees key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Push the vehicle forward.
    Accelerate,
    /// Brake, then reverse.
    Brake,
    SteerLeft,
    SteerRight,
    /// Snap nearly-straight wheels to exactly straight.
    CenterSteering,
    Handbrake,
    /// Switch the camera to chase mode.
    FollowCamera,
    /// Switch the camera to free-fly mode.
    FreeCamera,
    /// Advance the chase distance.
    CycleDistance,
    FlyForward,
    FlyBack,
    FlyLeft,
    FlyRight,
    FlyUp,
    FlyDown,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
}

impl Key {
    pub const ALL: [Self; 19] = [
        Self::Accelerate,
        Self::Brake,
        Self::SteerLeft,
        Self::SteerRight,
        Self::CenterSteering,
        Self::Handbrake,
        Self::FollowCamera,
        Self::FreeCamera,
        Self::CycleDistance,
        Self::FlyForward,
        Self::FlyBack,
        Self::FlyLeft,
        Self::FlyRight,
        Self::FlyUp,
        Self::FlyDown,
        Self::LookLeft,
        Self::LookRight,
        Self::LookUp,
        Self::LookDown,
    ];

    /// Kebab-case name, as accepted by [`Key::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Accelerate => "accelerate",
            Self::Brake => "brake",
            Self::SteerLeft => "steer-left",
            Self::SteerRight => "steer-right",
            Self::CenterSteering => "center-steering",
            Self::Handbrake => "handbrake",
            Self::FollowCamera => "follow-camera",
            Self::FreeCamera => "free-camera",
            Self::CycleDistance => "cycle-distance",
            Self::FlyForward => "fly-forward",
            Self::FlyBack => "fly-back",
            Self::FlyLeft => "fly-left",
            Self::FlyRight => "fly-right",
            Self::FlyUp => "fly-up",
            Self::FlyDown => "fly-down",
            Self::LookLeft => "look-left",
            Self::LookRight => "look-right",
            Self::LookUp => "look-up",
            Self::LookDown => "look-down",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key name that matched no [`Key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}'", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKey(s.to_owned()))
    }
}

/// The set of keys held during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    pressed: HashSet<Key>,
}

impl KeySet {
    /// An empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held.
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    /// Mark a key as released.
    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    /// Check whether a key is held.
    pub fn contains(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    /// Iterate over held keys in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed.iter().copied()
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            pressed: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[Key; N]> for KeySet {
    fn from(keys: [Key; N]) -> Self {
        keys.into_iter().collect()
    }
}
