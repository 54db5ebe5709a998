// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use solarnet_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Aggregation levels supported by datum queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// One minute.
    Minute,
    /// Five minutes.
    FiveMinute,
    /// Ten minutes.
    TenMinute,
    /// Fifteen minutes.
    FifteenMinute,
    /// Thirty minutes.
    ThirtyMinute,
    /// One hour.
    Hour,
    /// Hour of the day, across all days.
    HourOfDay,
    /// Hour of the day, per season.
    SeasonalHourOfDay,
    /// One day.
    Day,
    /// Day of the week, across all weeks.
    DayOfWeek,
    /// Day of the week, per season.
    SeasonalDayOfWeek,
    /// One week.
    Week,
    /// Week of the year, across all years.
    WeekOfYear,
    /// One month.
    Month,
    /// One year.
    Year,
    /// Everything, as a running total.
    RunningTotal,
    /// No aggregation.
    None,
}

impl Aggregation {
    /// Every aggregation, from the finest to the coarsest.
    pub const ALL: [Aggregation; 17] = [
        Aggregation::Minute,
        Aggregation::FiveMinute,
        Aggregation::TenMinute,
        Aggregation::FifteenMinute,
        Aggregation::ThirtyMinute,
        Aggregation::Hour,
        Aggregation::HourOfDay,
        Aggregation::SeasonalHourOfDay,
        Aggregation::Day,
        Aggregation::DayOfWeek,
        Aggregation::SeasonalDayOfWeek,
        Aggregation::Week,
        Aggregation::WeekOfYear,
        Aggregation::Month,
        Aggregation::Year,
        Aggregation::RunningTotal,
        Aggregation::None,
    ];

    /// The name used in query parameters.
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Minute => "Minute",
            Aggregation::FiveMinute => "FiveMinute",
            Aggregation::TenMinute => "TenMinute",
            Aggregation::FifteenMinute => "FifteenMinute",
            Aggregation::ThirtyMinute => "ThirtyMinute",
            Aggregation::Hour => "Hour",
            Aggregation::HourOfDay => "HourOfDay",
            Aggregation::SeasonalHourOfDay => "SeasonalHourOfDay",
            Aggregation::Day => "Day",
            Aggregation::DayOfWeek => "DayOfWeek",
            Aggregation::SeasonalDayOfWeek => "SeasonalDayOfWeek",
            Aggregation::Week => "Week",
            Aggregation::WeekOfYear => "WeekOfYear",
            Aggregation::Month => "Month",
            Aggregation::Year => "Year",
            Aggregation::RunningTotal => "RunningTotal",
            Aggregation::None => "None",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::config_invalid(format!("unknown aggregation: {s}")))
    }
}

/// How readings are computed by the datum reading endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumReadingType {
    /// Difference between the readings closest to the start and end dates.
    Difference,
    /// Like `Difference`, but only with readings near the requested dates.
    NearestDifference,
    /// Difference of the readings found within the requested dates.
    DifferenceWithin,
    /// Readings calculated at the requested date.
    CalculatedAt,
    /// Difference of readings calculated at the start and end dates.
    CalculatedAtDifference,
}

impl DatumReadingType {
    /// Every reading type.
    pub const ALL: [DatumReadingType; 5] = [
        DatumReadingType::Difference,
        DatumReadingType::NearestDifference,
        DatumReadingType::DifferenceWithin,
        DatumReadingType::CalculatedAt,
        DatumReadingType::CalculatedAtDifference,
    ];

    /// The name used in query parameters.
    pub fn name(&self) -> &'static str {
        match self {
            DatumReadingType::Difference => "Difference",
            DatumReadingType::NearestDifference => "NearestDifference",
            DatumReadingType::DifferenceWithin => "DifferenceWithin",
            DatumReadingType::CalculatedAt => "CalculatedAt",
            DatumReadingType::CalculatedAtDifference => "CalculatedAtDifference",
        }
    }
}

impl fmt::Display for DatumReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatumReadingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::config_invalid(format!("unknown reading type: {s}")))
    }
}
