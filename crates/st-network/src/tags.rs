//! Highway tag rules: speed limit, lane count, and direction of a way.
//!
//! Every `highway=*` way becomes a street, including footways and paths; the
//! non-car classes get a 1 km/h limit so they stay in the graph with finite
//! weight but are practically never chosen.
//!
//! Tags are passed as `(key, value)` slices so the rules work the same for
//! PBF elements, hand-built test data, and any other source.

/// Speed limit used when neither the class nor a `maxspeed` tag gives one.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

/// Speed limit for `maxspeed=none`.
pub const UNLIMITED_SPEED_KMH: f64 = 140.0;

const KMH_PER_MPH: f64 = 1.609_344;

/// Look up the value of `key`.
pub fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Default speed limit (km/h) for a `highway` class.
pub fn class_speed_kmh(highway: &str) -> f64 {
    match highway {
        "motorway"                                       => 140.0,
        "trunk"                                          => 120.0,
        "primary"                                        => 100.0,
        "secondary"                                      => 80.0,
        "tertiary"                                       => 70.0,
        "road" | "minor" | "unclassified"                => 50.0,
        "residential" | "track"                          => 30.0,
        "service"                                        => 20.0,
        "path"                                           => 10.0,
        "cycleway" | "bridleway" | "pedestrian" | "footway" => 1.0,
        _                                                => DEFAULT_SPEED_KMH,
    }
}

/// Default lane count for a `highway` class, if the class has one.
pub fn class_lanes(highway: &str) -> Option<f64> {
    match highway {
        "residential" | "tertiary" | "secondary" | "primary" => Some(2.0),
        "service" | "track" | "path"                         => Some(1.0),
        _                                                    => None,
    }
}

/// Parse a `maxspeed` value: plain km/h digits, `"<n> mph"`, or `"none"`.
///
/// Returns `None` for anything else (`"signals"`, `"walk"`, country codes…),
/// leaving the class default in place.
pub fn parse_max_speed(value: &str) -> Option<f64> {
    let value = value.trim();
    if value == "none" {
        return Some(UNLIMITED_SPEED_KMH);
    }
    if let Some(mph) = value.strip_suffix("mph") {
        return mph.trim().parse::<f64>().ok().map(|v| v * KMH_PER_MPH);
    }
    value.parse::<f64>().ok()
}

/// Direction(s) in which a way may be driven.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Both directions, each with its own street.
    Both,
    /// Only along the node order of the way.
    Forward,
    /// Only against the node order (`oneway=-1`).
    Backward,
}

/// Read the direction from the *value* of the `oneway` tag.
///
/// `yes`/`true`/`1` (any case) mean forward only, `-1`/`reverse` backward
/// only.  Without a `oneway` tag, motorways and roundabouts are implicitly
/// one-way; everything else is two-way.
pub fn direction(highway: &str, tags: &[(&str, &str)]) -> Direction {
    if let Some(value) = tag(tags, "oneway") {
        return match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Direction::Forward,
            "-1" | "reverse"     => Direction::Backward,
            _                    => Direction::Both,
        };
    }
    let roundabout = tag(tags, "junction") == Some("roundabout");
    if roundabout || matches!(highway, "motorway" | "motorway_link") {
        Direction::Forward
    } else {
        Direction::Both
    }
}

fn parse_lanes(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Street attributes derived from a way's tags.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StreetRule {
    pub max_speed_kmh:  f64,
    /// Lanes along the way's node order; `None` if not drivable that way.
    pub forward_lanes:  Option<f64>,
    /// Lanes against the way's node order; `None` if not drivable that way.
    pub backward_lanes: Option<f64>,
}

/// Derive the street rule for a way, or `None` if it has no `highway` tag.
///
/// Lanes come from `lanes`, else the class default, else 1.  Two-way streets
/// use `lanes:forward`/`lanes:backward` when both are tagged and otherwise
/// split the total evenly, so a 1-lane two-way street gets half a lane each
/// way.  A direction with zero lanes gets no street.
pub fn street_rule(tags: &[(&str, &str)]) -> Option<StreetRule> {
    let highway = tag(tags, "highway")?;

    let max_speed_kmh = tag(tags, "maxspeed")
        .and_then(parse_max_speed)
        .unwrap_or_else(|| class_speed_kmh(highway));

    let lanes = tag(tags, "lanes")
        .and_then(parse_lanes)
        .filter(|l| *l > 0.0)
        .or_else(|| class_lanes(highway))
        .unwrap_or(1.0);

    let (forward, backward) = match direction(highway, tags) {
        Direction::Forward  => (Some(lanes), None),
        Direction::Backward => (None, Some(lanes)),
        Direction::Both => {
            let explicit = tag(tags, "lanes:forward")
                .and_then(parse_lanes)
                .zip(tag(tags, "lanes:backward").and_then(parse_lanes));
            match explicit {
                Some((f, b)) => (Some(f), Some(b)),
                None         => (Some(lanes / 2.0), Some(lanes / 2.0)),
            }
        }
    };

    Some(StreetRule {
        max_speed_kmh,
        forward_lanes:  forward.filter(|l| *l > 0.0),
        backward_lanes: backward.filter(|l| *l > 0.0),
    })
}
