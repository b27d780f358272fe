//! Gentler substitutes for commonly risky practices.

/// Risky practice and its substitutes, checked in order.
const ALTERNATIVES: &[(&str, &[&str])] = &[
    (
        "headstand",
        &[
            "Legs Up the Wall (Viparita Karani)",
            "Supported Child's Pose",
            "Gentle Forward Fold with support",
        ],
    ),
    (
        "shoulderstand",
        &[
            "Legs Up the Wall",
            "Supported Bridge Pose",
            "Reclined Bound Angle Pose",
        ],
    ),
    (
        "wheel pose",
        &["Supported Bridge Pose", "Cobra Pose", "Cat-Cow Stretches"],
    ),
    (
        "deep twist",
        &[
            "Gentle Seated Twist",
            "Supine Twist with knees together",
            "Simple neck rotations",
        ],
    ),
    (
        "crow pose",
        &["Malasana (Squat)", "Plank with knees down", "Chair pose"],
    ),
    (
        "hot yoga",
        &["Gentle Hatha Yoga", "Restorative Yoga", "Yin Yoga"],
    ),
    (
        "power yoga",
        &["Gentle Flow", "Hatha Yoga", "Restorative Yoga"],
    ),
    (
        "inversions",
        &[
            "Legs Up the Wall",
            "Supported Shoulderstand against wall",
            "Gentle forward folds",
        ],
    ),
];

/// Substitutes offered when the practice is not recognised.
const DEFAULT_ALTERNATIVES: &[&str] = &[
    "Gentle Cat-Cow Stretches",
    "Supported Child's Pose",
    "Seated Meditation",
    "Gentle Breathing Exercises (without retention)",
];

/// Safer practices to suggest instead of `pose`.
pub fn safe_alternatives(pose: &str) -> &'static [&'static str] {
    let lowered = pose.to_lowercase();
    ALTERNATIVES
        .iter()
        .find(|(risky, _)| lowered.contains(risky))
        .map_or(DEFAULT_ALTERNATIVES, |(_, alternatives)| *alternatives)
}
