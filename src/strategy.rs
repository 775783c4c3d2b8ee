//! Estimation Strategies
//!
//! Each strategy answers the same question, "which pitch and azimuth should
//! this panel use?", in its own way. Only the clear-sky search does real
//! work; the NREL and Liu-Jordan strategies return the rule-of-thumb
//! orientation until proper models land.
//!
//! Adding a strategy means a new `StrategyId` variant, a type implementing
//! `AngleStrategy`, and an arm in `create_strategy`.

use serde::Serialize;

use crate::error::CalcError;
use crate::geo::Location;
use crate::model::IrradianceModel;
use crate::optimize::{self, AngleOptimum, Orientation};
use crate::time::{self, TimezoneResolver};

// ===================== REQUEST / RESULT =====================

/// Validated input shared by every strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    /// Tilt the installer has fixed; `None` lets the tilt be optimized
    pub fixed_tilt: Option<f64>,
    /// Calendar year to simulate; `None` means the current year
    pub year: Option<i32>,
}

impl AngleRequest {
    pub fn new(latitude: f64, longitude: f64, fixed_tilt: Option<f64>) -> Self {
        Self { latitude, longitude, altitude_m: 0.0, fixed_tilt, year: None }
    }

    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = altitude_m;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Optimal angles reported by one strategy
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StrategyResult {
    pub optimal_pitch: f64,
    pub optimal_azimuth: f64,
    /// Search diagnostics, only for strategies that search
    #[serde(skip)]
    pub search: Option<AngleOptimum>,
}

impl StrategyResult {
    /// Report `orientation` rounded to 2 decimals, the precision of the response.
    fn from_orientation(orientation: Orientation, search: Option<AngleOptimum>) -> Self {
        let o = orientation.rounded();
        Self { optimal_pitch: o.pitch_deg, optimal_azimuth: o.azimuth_deg, search }
    }

    /// Reject results outside pitch 0..=90 or azimuth 0..=360.
    pub fn validate(self, id: StrategyId) -> Result<Self, CalcError> {
        if !(0.0..=90.0).contains(&self.optimal_pitch) {
            return Err(CalcError::InternalInvariant(format!(
                "{} pitch {} outside 0..=90",
                id.name(),
                self.optimal_pitch
            )));
        }
        if !(0.0..=360.0).contains(&self.optimal_azimuth) {
            return Err(CalcError::InternalInvariant(format!(
                "{} azimuth {} outside 0..=360",
                id.name(),
                self.optimal_azimuth
            )));
        }
        Ok(self)
    }
}

/// One result per strategy; every key is always present.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResultCollection {
    pub pvlib: StrategyResult,
    pub nrel: StrategyResult,
    pub liu_jordan: StrategyResult,
}

impl ResultCollection {
    pub fn get(&self, id: StrategyId) -> &StrategyResult {
        match id {
            StrategyId::Pvlib => &self.pvlib,
            StrategyId::Nrel => &self.nrel,
            StrategyId::LiuJordan => &self.liu_jordan,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyId, &StrategyResult)> {
        StrategyId::ALL.into_iter().map(move |id| (id, self.get(id)))
    }
}

// ===================== STRATEGIES =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyId {
    /// Full clear-sky grid search
    Pvlib,
    Nrel,
    LiuJordan,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [StrategyId::Pvlib, StrategyId::Nrel, StrategyId::LiuJordan];

    /// Key used in the response
    pub fn name(self) -> &'static str {
        match self {
            StrategyId::Pvlib => "pvlib",
            StrategyId::Nrel => "nrel",
            StrategyId::LiuJordan => "liu_jordan",
        }
    }
}

pub trait AngleStrategy {
    fn id(&self) -> StrategyId;

    fn optimal_angles(&self, request: &AngleRequest) -> Result<StrategyResult, CalcError>;
}

/// Annual clear-sky POA grid search
pub struct ClearSkySearch<'a> {
    model: &'a dyn IrradianceModel,
    resolver: TimezoneResolver,
}

impl<'a> ClearSkySearch<'a> {
    pub fn new(model: &'a dyn IrradianceModel, resolver: TimezoneResolver) -> Self {
        Self { model, resolver }
    }
}

impl AngleStrategy for ClearSkySearch<'_> {
    fn id(&self) -> StrategyId {
        StrategyId::Pvlib
    }

    fn optimal_angles(&self, request: &AngleRequest) -> Result<StrategyResult, CalcError> {
        let location = Location::resolve(
            request.latitude,
            request.longitude,
            request.altitude_m,
            self.resolver,
        )?;
        let year = request.year.unwrap_or_else(|| time::current_year(location.tz));

        let optimum = optimize::optimize(self.model, &location, request.fixed_tilt, year)?;
        Ok(StrategyResult::from_orientation(optimum.orientation, Some(optimum)))
    }
}

/// Rule-of-thumb orientation standing in for a model that is not built yet
pub struct InitialGuess {
    id: StrategyId,
}

impl AngleStrategy for InitialGuess {
    fn id(&self) -> StrategyId {
        self.id
    }

    fn optimal_angles(&self, request: &AngleRequest) -> Result<StrategyResult, CalcError> {
        // TODO: replace with the NREL / Liu-Jordan transposition models
        let guess = optimize::initial_orientation(request.latitude, request.fixed_tilt);
        Ok(StrategyResult::from_orientation(guess, None))
    }
}

/// Create the strategy for `id`. The search strategy borrows `model`.
pub fn create_strategy<'a>(
    id: StrategyId,
    model: &'a dyn IrradianceModel,
    resolver: TimezoneResolver,
) -> Box<dyn AngleStrategy + 'a> {
    match id {
        StrategyId::Pvlib => Box::new(ClearSkySearch::new(model, resolver)),
        StrategyId::Nrel | StrategyId::LiuJordan => Box::new(InitialGuess { id }),
    }
}

fn run_one(
    id: StrategyId,
    request: &AngleRequest,
    model: &dyn IrradianceModel,
    resolver: TimezoneResolver,
) -> Result<StrategyResult, CalcError> {
    let strategy = create_strategy(id, model, resolver);
    let result = strategy.optimal_angles(request)?.validate(strategy.id())?;

    tracing::info!(
        strategy = id.name(),
        pitch = result.optimal_pitch,
        azimuth = result.optimal_azimuth,
        "strategy finished"
    );
    Ok(result)
}

/// Run every strategy against the same request.
///
/// Any strategy failure fails the whole collection.
pub fn run_all(
    request: &AngleRequest,
    model: &dyn IrradianceModel,
) -> Result<ResultCollection, CalcError> {
    run_all_with(request, model, time::resolve_timezone)
}

/// [`run_all`] with a caller-supplied timezone lookup.
pub fn run_all_with(
    request: &AngleRequest,
    model: &dyn IrradianceModel,
    resolver: TimezoneResolver,
) -> Result<ResultCollection, CalcError> {
    Ok(ResultCollection {
        pvlib: run_one(StrategyId::Pvlib, request, model, resolver)?,
        nrel: run_one(StrategyId::Nrel, request, model, resolver)?,
        liu_jordan: run_one(StrategyId::LiuJordan, request, model, resolver)?,
    })
}
