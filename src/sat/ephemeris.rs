//! A satellite pass predictor from Keplerian elements
//!
//! Computes when a satellite next flies over a ground point or region,
//! which lets a device hold its transmission until a pass window opens.
//! The model propagates the orbital elements with their secular rates,
//! computes the two geodetic longitudes where each orbit crosses the target
//! latitude, and scans forward until a crossing falls within the longitude
//! tolerance of the target.

use crate::error::Error;
use crate::sat::math::{asin, atan, cos, fabs, fmod, round, sin, sqrt, tan};
use core::f64::consts::PI;

/// Earth radius at the equator in meters
const EARTH_RADIUS: f64 = 6_378_136.999_954_619;
/// Earth rotation rate in rad/s
const EARTH_ROTATION_RATE: f64 = 7.292_115_855_377_074e-5;
/// The TEME reference epoch (Unix seconds)
const TEME_REF_DATETIME: u64 = 1_798_761_600;
/// The Earth rotation angle at the TEME reference epoch (radians)
const TEME_REF_ANGLE: f64 = 1.752_697_146_971_250_7;
/// The lowest elevation angle that still counts as a pass (degrees)
const ELEVATION_ANGLE_TOLERANCE: f64 = 30.0;
/// The orbit radius of the satellites in meters
const SAT_ELEVATION: f64 = 6_892_550.590_445_475;

/// A bound on the forward scan, to fail instead of spinning on
/// pathological elements
const MAX_SCANNED_ORBITS: u32 = 10_000;

/// Converts an angle in degrees to radians
fn deg2rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

/// Converts an angle in radians to degrees
fn rad2deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

/// The orbital elements of a satellite at a reference epoch
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrbitInfo {
    /// Reference epoch time (seconds since the Unix epoch)
    pub t0: u64,
    /// Mean motion at the epoch (orbits per second)
    pub n0: f64,
    /// Rate of change of the mean motion (orbits per second^2)
    pub ndot: f64,
    /// Right ascension of the ascending node at the epoch (radians)
    pub raan0: f64,
    /// Rate of change of the RAAN (radians per second)
    pub raandot: f64,
    /// Argument of perigee at the epoch (radians)
    pub aop0: f64,
    /// Rate of change of the argument of perigee (radians per second)
    pub aopdot: f64,
    /// Inclination (degrees)
    pub inclination: f64,
    /// Eccentricity (unitless, 0 = circular)
    pub eccentricity: f64,
}

/// A ground location
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroundPoint {
    /// Latitude in degrees, North positive
    pub lat: f64,
    /// Longitude in degrees, East positive
    pub lon: f64,
}

/// A rectangular ground region around a midpoint
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroundRegion {
    /// Latitude of the region midpoint in degrees
    pub lat: f64,
    /// Longitude of the region midpoint in degrees
    pub lon: f64,
    /// Latitude span of the region in degrees
    pub lat_range: f64,
    /// Longitude span of the region in degrees
    pub lon_range: f64,
}

/// A predicted satellite pass
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PassInfo {
    /// Longitude of the satellite at pass time (degrees, East positive)
    pub lon: f64,
    /// Time of the pass (Unix seconds); for a region, the midpoint of the
    /// pass window
    pub t: u64,
    /// Length of the pass window in seconds; zero for a point
    pub duration: u32,
    /// Whether the satellite is moving northward at pass time
    pub ascending: bool,
}

/// A latitude crossing of one orbit
#[derive(Debug, Clone, Copy)]
struct Crossing {
    /// The crossing time (Unix seconds)
    t: u64,
    /// The geodetic longitude of the crossing (degrees)
    lon: f64,
}

/// An accepted pass, together with the orbit it was found on
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// The pass itself
    pass: PassInfo,
    /// The orbit count of the pass
    count: i32,
    /// 0 for the ascending crossing, 1 for the descending one
    index: usize,
}

/// A sign-following floating-point modulo with result in `[0, y)` for
/// positive `y`
fn signed_fmod(x: f64, y: f64) -> f64 {
    if y == 0.0 {
        return f64::NAN;
    }
    let ret = fmod(x, y);
    if ret != 0.0 && ((y < 0.0 && ret > 0.0) || (y > 0.0 && ret < 0.0)) {
        return ret + y;
    }
    ret
}

/// Normalizes an angle to the range `[0, 2π)`
fn zero_to_2pi(angle: f64) -> f64 {
    if angle < 0.0 {
        return angle + 2.0 * PI;
    }
    fmod(angle, 2.0 * PI)
}

/// Normalizes an angle to the range `[-180, 180)`
fn minus_180_to_180(angle: f64) -> f64 {
    signed_fmod(angle + 180.0, 360.0) - 180.0
}

/// Normalizes an angle to the range `[0, 360)`
fn zero_to_360(angle: f64) -> f64 {
    signed_fmod(angle, 360.0)
}

/// Computes the mean anomaly from the true anomaly
fn mean_anomaly(e: f64, theta: f64) -> f64 {
    if e == 0.0 {
        return theta;
    }
    let ecc = 2.0 * atan(sqrt((1.0 - e) / (1.0 + e)) * tan(theta / 2.0));
    zero_to_2pi(ecc - e * sin(ecc))
}

/// The time of the ascending node of the given orbit count
fn anode_time(orbit: &OrbitInfo, count: i32) -> u64 {
    let count = f64::from(count);
    let dt = if orbit.ndot == 0.0 {
        count / orbit.n0
    } else {
        (sqrt(orbit.n0 * orbit.n0 + 2.0 * orbit.ndot * count) - orbit.n0) / orbit.ndot
    };
    orbit.t0.saturating_add_signed(round(dt) as i64)
}

/// The orbit count at the given time
fn orbit_count(orbit: &OrbitInfo, t: u64) -> i32 {
    let dt = t as i64 as f64 - orbit.t0 as i64 as f64;
    (orbit.n0 * dt + 0.5 * orbit.ndot * dt * dt) as i32
}

/// The geodetic longitude below a right ascension at the given time
fn longitude(ra: f64, t: u64) -> f64 {
    let dt = t as i64 as f64 - TEME_REF_DATETIME as i64 as f64;
    let lon_rad = ra - TEME_REF_ANGLE - EARTH_ROTATION_RATE * dt;
    minus_180_to_180(rad2deg(lon_rad))
}

/// The ascending and descending crossings of the target latitude on the
/// given orbit
///
/// Returns `None` when the orbit never reaches the latitude.
fn tll_crossings(orbit: &OrbitInfo, tll: f64, count: i32) -> Option<[Crossing; 2]> {
    let latrad = deg2rad(tll);
    let inclination = deg2rad(orbit.inclination);
    if !(0.0..=PI).contains(&inclination) {
        return None;
    }
    if fabs(sin(inclination)) <= fabs(sin(latrad)) {
        return None;
    }

    let anode = anode_time(orbit, count);
    let dt_anode = anode as i64 as f64 - orbit.t0 as i64 as f64;
    let raan = orbit.raan0 + orbit.raandot * dt_anode;
    let aop = orbit.aop0 + orbit.aopdot * dt_anode;
    let orbit_period = 1.0 / (orbit.n0 + orbit.ndot * dt_anode);

    // Right ascensions of the ascending and descending crossings
    let offset = asin(tan(latrad) / tan(inclination));
    let (ra1, ra2) = match latrad >= 0.0 {
        true => (raan + offset, raan + PI - offset),
        false => (raan + PI - offset, raan + offset),
    };

    // Arguments of latitude of the crossings
    let (lam1, lam2) = match latrad >= 0.0 {
        true => {
            let lam1 = asin(sin(latrad) / sin(inclination));
            (lam1, PI - lam1)
        }
        false => {
            let lam1 = PI - asin(sin(latrad) / sin(inclination));
            (lam1, 3.0 * PI - lam1)
        }
    };
    if !(0.0..2.0 * PI).contains(&lam1) || !(0.0..2.0 * PI).contains(&lam2) || lam1 >= lam2 {
        return None;
    }

    // Convert to time offsets from the ascending node via the mean anomaly
    let me0 = mean_anomaly(orbit.eccentricity, -aop);
    let me1 = mean_anomaly(orbit.eccentricity, lam1 - aop);
    let me2 = mean_anomaly(orbit.eccentricity, lam2 - aop);

    let t1 = anode
        .saturating_add(round(signed_fmod(orbit_period * (me1 - me0) / (2.0 * PI), orbit_period)) as u64);
    let t2 = anode
        .saturating_add(round(signed_fmod(orbit_period * (me2 - me0) / (2.0 * PI), orbit_period)) as u64);
    Some([Crossing { t: t1, lon: longitude(ra1, t1) }, Crossing { t: t2, lon: longitude(ra2, t2) }])
}

/// The longitude tolerance at the given latitude
///
/// Closed-form solution of the grazing-ray triangle for the elevation-angle
/// floor; the tolerance widens towards the poles.
fn lon_tolerance(lat: f64) -> f64 {
    let a = deg2rad(ELEVATION_ANGLE_TOLERANCE + 90.0);
    let c = asin(EARTH_RADIUS * sin(a) / SAT_ELEVATION);
    let b = EARTH_RADIUS * cos(PI - asin(SAT_ELEVATION * (sin(c) / EARTH_RADIUS)))
        + SAT_ELEVATION * cos(c);
    let b_angle = asin(b * sin(c) / EARTH_RADIUS);
    rad2deg(asin((EARTH_RADIUS * sin(b_angle)) / (EARTH_RADIUS * cos(deg2rad(lat)))))
}

/// Whether a crossing is within the longitude tolerance of the target
fn within_tolerance(crossing: &Crossing, lon: f64, lon_tol: f64) -> bool {
    fabs(minus_180_to_180(crossing.lon - lon)) <= lon_tol
}

/// Scans forward along one crossing side until the window passes the target
///
/// Returns the accepted pass, or `None` once the target longitude has
/// rotated out of reach of this side; `crossings` is left at the last orbit
/// examined.
#[allow(clippy::too_many_arguments, reason = "Plain port of the reference search")]
fn scan_side(
    orbit: &OrbitInfo,
    ascending: bool,
    delta_lon: f64,
    lon_tol: f64,
    lat: f64,
    lon: f64,
    crossings: &mut [Crossing; 2],
    t: u64,
) -> Result<Option<Candidate>, Error> {
    // Jump ahead by the time the Earth needs to rotate under the crossing
    let dt = deg2rad(delta_lon) / EARTH_ROTATION_RATE;
    let index = usize::from(!ascending);
    #[allow(clippy::indexing_slicing, reason = "The index is 0 or 1")]
    let mut count = orbit_count(orbit, crossings[index].t.saturating_add(round(dt) as u64));

    *crossings = tll_crossings(orbit, lat, count).ok_or(Error::InvalidArgument)?;
    for _ in 0..MAX_SCANNED_ORBITS {
        #[allow(clippy::indexing_slicing, reason = "The index is 0 or 1")]
        let crossing = crossings[index];
        if 360.0 - zero_to_360(lon - lon_tol - crossing.lon) >= 180.0 {
            return Ok(None);
        }
        if within_tolerance(&crossing, lon, lon_tol) && crossing.t > t {
            let ascending_pass = if ascending { lat > 0.0 } else { lat <= 0.0 };
            let pass = PassInfo { lon: crossing.lon, t: crossing.t, duration: 0, ascending: ascending_pass };
            return Ok(Some(Candidate { pass, count, index }));
        }
        count += 1;
        *crossings = tll_crossings(orbit, lat, count).ok_or(Error::InvalidArgument)?;
    }
    Err(Error::InvalidArgument)
}

/// Finds the next pass over `(lat, lon)` after `t` with the given longitude
/// tolerance
fn find_next_pass(orbit: &OrbitInfo, t: u64, lat: f64, lon: f64, lon_tol: f64) -> Result<Candidate, Error> {
    let mut count = orbit_count(orbit, t);
    if count <= 0 {
        return Err(Error::InvalidArgument);
    }

    // Advance to the first orbit whose ascending crossing lies in the future
    let mut crossings = tll_crossings(orbit, lat, count).ok_or(Error::InvalidArgument)?;
    while crossings[0].t <= t {
        count += 1;
        crossings = tll_crossings(orbit, lat, count).ok_or(Error::InvalidArgument)?;
    }

    // The current orbit may already pass over the target
    if within_tolerance(&crossings[0], lon, lon_tol) && crossings[0].t > t {
        let pass = PassInfo { lon: crossings[0].lon, t: crossings[0].t, duration: 0, ascending: lat > 0.0 };
        return Ok(Candidate { pass, count, index: 0 });
    }
    if within_tolerance(&crossings[1], lon, lon_tol) && crossings[1].t > t {
        let pass = PassInfo { lon: crossings[1].lon, t: crossings[1].t, duration: 0, ascending: lat <= 0.0 };
        return Ok(Candidate { pass, count, index: 1 });
    }

    // Otherwise scan whichever side comes into tolerance first, repeatedly
    let mut t = t;
    for _ in 0..MAX_SCANNED_ORBITS {
        let delta_lon_a = 360.0 - zero_to_360(lon + lon_tol - crossings[0].lon);
        let delta_lon_d = 360.0 - zero_to_360(lon + lon_tol - crossings[1].lon);

        let ascending = delta_lon_a < delta_lon_d;
        let delta_lon = if ascending { delta_lon_a } else { delta_lon_d };
        let found = scan_side(orbit, ascending, delta_lon, lon_tol, lat, lon, &mut crossings, t)?;
        if let Some(candidate) = found {
            return Ok(candidate);
        }
        #[allow(clippy::indexing_slicing, reason = "The index is 0 or 1")]
        {
            t = crossings[usize::from(!ascending)].t;
        }
    }
    Err(Error::InvalidArgument)
}

/// The next pass of the satellite over a ground point
///
/// Returns the first pass whose time is strictly after `t`.
pub fn next_pass(orbit: &OrbitInfo, t: u64, ground: &GroundPoint) -> Result<PassInfo, Error> {
    let lon_tol = lon_tolerance(ground.lat);
    let candidate = find_next_pass(orbit, t, ground.lat, ground.lon, lon_tol)?;
    Ok(candidate.pass)
}

/// The next pass of the satellite over a ground region
///
/// The longitude tolerance is widened by half the region's longitude span,
/// so the pass triggers as soon as any part of the region is within the
/// satellite's footprint. `t` is the midpoint of the window during which
/// the satellite sweeps from one latitude bound to the other, and
/// `duration` is the window length.
pub fn next_pass_region(orbit: &OrbitInfo, t: u64, region: &GroundRegion) -> Result<PassInfo, Error> {
    let lon_tol = lon_tolerance(region.lat) + fabs(region.lon_range) / 2.0;
    let candidate = find_next_pass(orbit, t, region.lat, region.lon, lon_tol)?;

    // Bound the window by the crossings of the region's latitude bounds on
    // the same orbit and side; bounds beyond the orbit's latitude reach
    // collapse onto the midpoint crossing
    let t_center = candidate.pass.t;
    let bound = |lat: f64| -> u64 {
        let crossings = tll_crossings(orbit, lat, candidate.count);
        let crossing = crossings.as_ref().and_then(|crossings| crossings.get(candidate.index));
        crossing.map(|crossing| crossing.t).unwrap_or(t_center)
    };
    let t_lo = bound(region.lat - fabs(region.lat_range) / 2.0);
    let t_hi = bound(region.lat + fabs(region.lat_range) / 2.0);

    let start = t_lo.min(t_hi);
    let end = t_lo.max(t_hi);
    Ok(PassInfo {
        lon: candidate.pass.lon,
        t: start.saturating_add(end.saturating_sub(start) / 2),
        duration: end.saturating_sub(start).min(u64::from(u32::MAX)) as u32,
        ascending: candidate.pass.ascending,
    })
}
