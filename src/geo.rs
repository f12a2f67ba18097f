// ABOUTME: Great-circle distance math for provider search
// ABOUTME: Haversine distance in kilometres and a nulls-last distance ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::cmp::Ordering;

use crate::constants::search::EARTH_RADIUS_KM;

/// Haversine distance in kilometres between two `(latitude, longitude)` points
#[must_use]
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Ascending distance order with unknown distances last
#[must_use]
pub fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
