//! Physical units and unit-carrying arrays.
//!
//! This is deliberately small: a [`Unit`] is a product of named units raised to
//! integer powers (plus an optional numeric scale), and each named unit knows how
//! it decomposes into the irreducible [`BaseUnit`]s. That is enough to convert
//! coordinates (e.g. exposure times in ms to s) and to ask whether a data unit
//! already contains time, which is what the exposure time correction needs.
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    f64::consts::PI,
    fmt::Display,
    ops::{Div, Mul},
    str::FromStr,
    sync::OnceLock,
};

use itertools::Itertools;
use ndarray::{arr0, Array1, ArrayD};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct UnknownUnitError {
    pub quantity: &'static str,
    pub unit: String
}

impl UnknownUnitError {
    fn new<S: ToString>(quantity: &'static str, unit: S) -> Self {
        Self { quantity, unit: unit.to_string() }
    }
}

impl Display for UnknownUnitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown {} unit '{}'", self.quantity, self.unit)
    }
}

impl std::error::Error for UnknownUnitError {}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UnitError {
    #[error(transparent)]
    Unknown(#[from] UnknownUnitError),
    #[error("Could not interpret '{token}' in unit string '{unit}'")]
    Parse { unit: String, token: String },
    #[error("'{from}' and '{to}' are not convertible")]
    Incompatible { from: String, to: String },
}

/// The irreducible units everything else decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum BaseUnit {
    #[strum(serialize = "m")]
    Meter,
    #[strum(serialize = "kg")]
    Kilogram,
    #[strum(serialize = "s")]
    Second,
    #[strum(serialize = "A")]
    Ampere,
    #[strum(serialize = "K")]
    Kelvin,
    #[strum(serialize = "mol")]
    Mole,
    #[strum(serialize = "cd")]
    Candela,
    #[strum(serialize = "rad")]
    Radian,
    #[strum(serialize = "ct")]
    Count,
    #[strum(serialize = "DN")]
    DataNumber,
    #[strum(serialize = "ph")]
    Photon,
    #[strum(serialize = "pix")]
    Pixel,
}

#[derive(Debug)]
struct NamedUnit {
    symbol: &'static str,
    aliases: &'static [&'static str],
    scale: f64,
    bases: &'static [(BaseUnit, i32)],
}

const LENGTH: &[(BaseUnit, i32)] = &[(BaseUnit::Meter, 1)];
const TIME: &[(BaseUnit, i32)] = &[(BaseUnit::Second, 1)];
const MASS: &[(BaseUnit, i32)] = &[(BaseUnit::Kilogram, 1)];
const ANGLE: &[(BaseUnit, i32)] = &[(BaseUnit::Radian, 1)];
const SOLID_ANGLE: &[(BaseUnit, i32)] = &[(BaseUnit::Radian, 2)];
const FREQUENCY: &[(BaseUnit, i32)] = &[(BaseUnit::Second, -1)];
const ENERGY: &[(BaseUnit, i32)] = &[(BaseUnit::Kilogram, 1), (BaseUnit::Meter, 2), (BaseUnit::Second, -2)];
const POWER: &[(BaseUnit, i32)] = &[(BaseUnit::Kilogram, 1), (BaseUnit::Meter, 2), (BaseUnit::Second, -3)];
const ELECTRON_VOLT: f64 = 1.602176634e-19;

macro_rules! named {
    ($symbol:literal, [$($alias:literal),*], $scale:expr, $bases:expr) => {
        NamedUnit { symbol: $symbol, aliases: &[$($alias),*], scale: $scale, bases: $bases }
    };
}

static NAMED_UNITS: &[NamedUnit] = &[
    named!("m", ["meter"], 1.0, LENGTH),
    named!("km", [], 1e3, LENGTH),
    named!("cm", [], 1e-2, LENGTH),
    named!("mm", [], 1e-3, LENGTH),
    named!("um", ["micron"], 1e-6, LENGTH),
    named!("nm", [], 1e-9, LENGTH),
    named!("Angstrom", ["AA", "angstrom"], 1e-10, LENGTH),
    named!("s", ["second"], 1.0, TIME),
    named!("ms", [], 1e-3, TIME),
    named!("min", [], 60.0, TIME),
    named!("h", ["hour"], 3600.0, TIME),
    named!("kg", [], 1.0, MASS),
    named!("g", [], 1e-3, MASS),
    named!("K", [], 1.0, &[(BaseUnit::Kelvin, 1)]),
    named!("A", [], 1.0, &[(BaseUnit::Ampere, 1)]),
    named!("mol", [], 1.0, &[(BaseUnit::Mole, 1)]),
    named!("cd", [], 1.0, &[(BaseUnit::Candela, 1)]),
    named!("rad", [], 1.0, ANGLE),
    named!("deg", [], PI / 180.0, ANGLE),
    named!("arcmin", [], PI / 10_800.0, ANGLE),
    named!("arcsec", [], PI / 648_000.0, ANGLE),
    named!("sr", [], 1.0, SOLID_ANGLE),
    named!("Hz", [], 1.0, FREQUENCY),
    named!("J", [], 1.0, ENERGY),
    named!("erg", [], 1e-7, ENERGY),
    named!("eV", [], ELECTRON_VOLT, ENERGY),
    named!("keV", [], ELECTRON_VOLT * 1e3, ENERGY),
    named!("W", [], 1.0, POWER),
    named!("ct", ["count", "counts"], 1.0, &[(BaseUnit::Count, 1)]),
    named!("DN", ["dn"], 1.0, &[(BaseUnit::DataNumber, 1)]),
    named!("ph", ["photon", "photons"], 1.0, &[(BaseUnit::Photon, 1)]),
    named!("pix", ["pixel", "pixels"], 1.0, &[(BaseUnit::Pixel, 1)]),
];

fn lookup_named_unit(name: &str) -> Option<&'static NamedUnit> {
    NAMED_UNITS
        .iter()
        .find(|u| u.symbol == name || u.aliases.contains(&name))
}

#[derive(Debug, Clone, Copy)]
struct Symbol(&'static NamedUnit);

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.symbol == other.0.symbol
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.symbol.cmp(other.0.symbol)
    }
}

/// A unit expressed as `scale * product(named_unit ^ power)`.
///
/// Two units compare equal only if they are written with the same named units,
/// so `ct / s * s` equals `ct` but `km` does not equal `1000 m`. Use
/// [`Unit::is_equivalent`] for a dimensional comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    scale: f64,
    powers: BTreeMap<Symbol, i32>,
}

impl Default for Unit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl Unit {
    pub fn dimensionless() -> Self {
        Self { scale: 1.0, powers: BTreeMap::new() }
    }

    /// Create a unit from a single named unit such as "s" or "arcsec".
    pub fn named(name: &str) -> Result<Self, UnknownUnitError> {
        let named = lookup_named_unit(name)
            .ok_or_else(|| UnknownUnitError::new("physical", name))?;
        Ok(Self { scale: 1.0, powers: BTreeMap::from([(Symbol(named), 1)]) })
    }

    pub fn second() -> Self {
        Self::builtin("s")
    }

    pub fn meter() -> Self {
        Self::builtin("m")
    }

    pub fn degree() -> Self {
        Self::builtin("deg")
    }

    pub fn arcsec() -> Self {
        Self::builtin("arcsec")
    }

    pub fn count() -> Self {
        Self::builtin("ct")
    }

    fn builtin(symbol: &'static str) -> Self {
        match lookup_named_unit(symbol) {
            Some(named) => Self { scale: 1.0, powers: BTreeMap::from([(Symbol(named), 1)]) },
            None => unreachable!("'{symbol}' is missing from the named unit table"),
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn powi(&self, n: i32) -> Self {
        let powers = self.powers.iter()
            .map(|(&s, &p)| (s, p * n))
            .filter(|(_, p)| *p != 0)
            .collect();
        Self { scale: self.scale.powi(n), powers }
    }

    /// Express this unit in terms of [`BaseUnit`]s only.
    pub fn decompose(&self) -> DecomposedUnit {
        let mut scale = self.scale;
        let mut bases: BTreeMap<BaseUnit, i32> = BTreeMap::new();
        for (symbol, &power) in self.powers.iter() {
            scale *= symbol.0.scale.powi(power);
            for &(base, base_power) in symbol.0.bases {
                *bases.entry(base).or_default() += base_power * power;
            }
        }
        bases.retain(|_, p| *p != 0);
        DecomposedUnit { scale, bases }
    }

    /// True if both units have the same dimensions, regardless of scale.
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        self.decompose().bases == other.decompose().bases
    }

    /// Factor to multiply values in this unit by to express them in `other`.
    pub fn conversion_factor(&self, other: &Unit) -> Result<f64, UnitError> {
        let mine = self.decompose();
        let theirs = other.decompose();
        if mine.bases != theirs.bases {
            return Err(UnitError::Incompatible { from: self.to_string(), to: other.to_string() });
        }
        Ok(mine.scale / theirs.scale)
    }

    fn combine(&self, other: &Unit, sign: i32) -> Unit {
        let mut powers = self.powers.clone();
        for (&symbol, &power) in other.powers.iter() {
            *powers.entry(symbol).or_default() += sign * power;
        }
        powers.retain(|_, p| *p != 0);
        let scale = if sign > 0 { self.scale * other.scale } else { self.scale / other.scale };
        Unit { scale, powers }
    }
}

impl Mul<&Unit> for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Self::Output {
        self.combine(rhs, 1)
    }
}

impl Div<&Unit> for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Self::Output {
        self.combine(rhs, -1)
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn term(symbol: &Symbol, power: i32) -> String {
            if power == 1 {
                symbol.0.symbol.to_string()
            } else {
                format!("{}{power}", symbol.0.symbol)
            }
        }

        if self.powers.is_empty() {
            return if self.scale == 1.0 {
                write!(f, "dimensionless")
            } else {
                write!(f, "{}", self.scale)
            };
        }

        let numer = self.powers.iter()
            .filter(|&(_, &p)| p > 0)
            .map(|(s, &p)| term(s, p))
            .join(" ");
        let denom = self.powers.iter()
            .filter(|&(_, &p)| p < 0)
            .map(|(s, &p)| term(s, -p))
            .collect_vec();

        if self.scale != 1.0 {
            write!(f, "{} ", self.scale)?;
        }

        if numer.is_empty() {
            write!(f, "1")?;
        } else {
            write!(f, "{numer}")?;
        }

        match denom.len() {
            0 => Ok(()),
            1 => write!(f, " / {}", denom[0]),
            _ => write!(f, " / ({})", denom.join(" ")),
        }
    }
}

fn unit_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)\^?(-?\d+)?$").expect("unit token regex should compile")
    })
}

fn parse_product(part: &str, full: &str) -> Result<Unit, UnitError> {
    let part = part.trim().trim_start_matches('(').trim_end_matches(')');
    let mut unit = Unit::dimensionless();
    for token in part.split(|c: char| c.is_whitespace() || c == '*').filter(|t| !t.is_empty()) {
        if let Ok(factor) = token.parse::<f64>() {
            unit.scale *= factor;
            continue;
        }

        let caps = unit_token_regex()
            .captures(token)
            .ok_or_else(|| UnitError::Parse { unit: full.to_string(), token: token.to_string() })?;
        let power = match caps.get(2) {
            Some(p) => p.as_str().parse::<i32>()
                .map_err(|_| UnitError::Parse { unit: full.to_string(), token: token.to_string() })?,
            None => 1,
        };
        if power.unsigned_abs() > MAX_POWER {
            return Err(UnitError::Parse { unit: full.to_string(), token: token.to_string() });
        }
        let named = Unit::named(&caps[1])?;
        unit = within_power_limit(&unit * &named.powi(power), full, token)?;
    }
    Ok(unit)
}

/// Largest exponent a parsed unit may carry. Each parsing step adds at most this
/// much to an exponent already within it, so the arithmetic cannot overflow.
const MAX_POWER: u32 = 1000;

fn within_power_limit(unit: Unit, full: &str, token: &str) -> Result<Unit, UnitError> {
    if unit.powers.values().all(|p| p.unsigned_abs() <= MAX_POWER) {
        Ok(unit)
    } else {
        Err(UnitError::Parse { unit: full.to_string(), token: token.to_string() })
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    /// Parse strings like "ct", "ct / s", "W / (m2 sr nm)" or "erg s-1 cm**-2".
    /// Every "/" divides by everything that follows it up to the next "/".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "dimensionless" {
            return Ok(Unit::dimensionless());
        }

        let normalized = trimmed.replace("**", "^");
        let mut parts = normalized.split('/');
        let mut unit = match parts.next() {
            Some(numer) => parse_product(numer, trimmed)?,
            None => Unit::dimensionless(),
        };
        for denom in parts {
            unit = within_power_limit(&unit / &parse_product(denom, trimmed)?, trimmed, denom.trim())?;
        }
        Ok(unit)
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(value: Unit) -> Self {
        value.to_string()
    }
}

/// A unit reduced to [`BaseUnit`]s, e.g. "W / m2" becomes kg s-3.
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedUnit {
    pub scale: f64,
    bases: BTreeMap<BaseUnit, i32>,
}

impl DecomposedUnit {
    /// The base units with a non-zero power.
    pub fn bases(&self) -> impl Iterator<Item = BaseUnit> + '_ {
        self.bases.keys().copied()
    }

    pub fn power_of(&self, base: BaseUnit) -> i32 {
        self.bases.get(&base).copied().unwrap_or(0)
    }

    pub fn contains(&self, base: BaseUnit) -> bool {
        self.bases.contains_key(&base)
    }
}

/// An array of values (possibly zero-dimensional) with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: ArrayD<f64>,
    unit: Unit,
}

impl Quantity {
    pub fn new(value: ArrayD<f64>, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn scalar(value: f64, unit: Unit) -> Self {
        Self { value: arr0(value).into_dyn(), unit }
    }

    pub fn from_vec(values: Vec<f64>, unit: Unit) -> Self {
        Self { value: Array1::from_vec(values).into_dyn(), unit }
    }

    pub fn value(&self) -> &ArrayD<f64> {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn into_parts(self) -> (ArrayD<f64>, Unit) {
        (self.value, self.unit)
    }

    pub fn is_scalar(&self) -> bool {
        self.value.ndim() == 0
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Convert to another, dimensionally equivalent unit.
    pub fn to(&self, unit: &Unit) -> Result<Quantity, UnitError> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(Quantity { value: self.value.mapv(|v| v * factor), unit: unit.clone() })
    }

    /// Smallest non-NaN value, as a scalar quantity.
    pub fn min(&self) -> Option<Quantity> {
        self.value.iter().copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
            .map(|v| Quantity::scalar(v, self.unit.clone()))
    }

    /// Largest non-NaN value, as a scalar quantity.
    pub fn max(&self) -> Option<Quantity> {
        self.value.iter().copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
            .map(|v| Quantity::scalar(v, self.unit.clone()))
    }

    pub fn first(&self) -> Option<Quantity> {
        self.value.iter().next().map(|&v| Quantity::scalar(v, self.unit.clone()))
    }

    pub fn last(&self) -> Option<Quantity> {
        self.value.iter().last().map(|&v| Quantity::scalar(v, self.unit.clone()))
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_scalar() {
            let v = self.value.iter().next().copied().unwrap_or(f64::NAN);
            write!(f, "{v}")?;
        } else {
            write!(f, "[{}]", self.value.iter().join(", "))?;
        }

        if self.unit.is_dimensionless() && self.unit.scale == 1.0 {
            Ok(())
        } else {
            write!(f, " {}", self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case("ct", "ct")]
    #[case("ct/s", "ct / s")]
    #[case("ct s-1", "ct / s")]
    #[case("W / (m2 sr nm)", "W / (m2 nm sr)")]
    #[case("erg / s / cm**2 / sr / Angstrom", "erg / (Angstrom cm2 s sr)")]
    #[case("1 / s", "1 / s")]
    #[case("", "dimensionless")]
    fn test_parse_and_display(#[case] input: &str, #[case] expected: &str) {
        let unit: Unit = input.parse().unwrap();
        assert_eq!(unit.to_string(), expected);
    }

    #[rstest]
    #[case("m2147483647 m")]
    #[case("m-2147483648")]
    #[case("m1000 m")]
    #[case("s-1000 / s")]
    #[case("m99999999999")]
    fn test_unreasonable_powers_rejected(#[case] input: &str) {
        let err = input.parse::<Unit>().unwrap_err();
        assert!(matches!(err, UnitError::Parse { .. }), "{err}");
    }

    #[test]
    fn test_unknown_unit() {
        let err = "ct / fortnight".parse::<Unit>().unwrap_err();
        assert!(matches!(err, UnitError::Unknown(UnknownUnitError { ref unit, .. }) if unit == "fortnight"));
    }

    #[test]
    fn test_mul_div_restores_unit() {
        let ct = Unit::count();
        let s = Unit::second();
        let rate = &ct / &s;
        assert_ne!(rate, ct);
        assert_eq!(&rate * &s, ct);
    }

    #[test]
    fn test_decompose_bases() {
        let radiance: Unit = "W / (m2 sr nm)".parse().unwrap();
        let decomposed = radiance.decompose();
        assert!(decomposed.contains(BaseUnit::Second));
        assert_eq!(decomposed.power_of(BaseUnit::Second), -3);
        assert_eq!(decomposed.power_of(BaseUnit::Meter), -1);
        assert_eq!(decomposed.power_of(BaseUnit::Radian), -2);
        assert_abs_diff_eq!(decomposed.scale, 1e9, epsilon = 1e-3);

        let counts = Unit::count().decompose();
        assert_eq!(counts.bases().collect_vec(), vec![BaseUnit::Count]);
        assert!(!counts.contains(BaseUnit::Second));
    }

    #[test]
    fn test_quantity_conversion() {
        let ms: Unit = "ms".parse().unwrap();
        let q = Quantity::from_vec(vec![500.0, 1500.0], ms);
        let s = q.to(&Unit::second()).unwrap();
        assert_abs_diff_eq!(s.value()[[0]], 0.5);
        assert_abs_diff_eq!(s.value()[[1]], 1.5);
        assert_eq!(s.unit(), &Unit::second());

        let err = q.to(&Unit::meter()).unwrap_err();
        assert!(matches!(err, UnitError::Incompatible { .. }));
    }

    #[test]
    fn test_quantity_display_and_range() {
        let q = Quantity::from_vec(vec![3.0, f64::NAN, 1.0, 2.0], Unit::second());
        assert_eq!(q.min().unwrap().to_string(), "1 s");
        assert_eq!(q.max().unwrap().to_string(), "3 s");
        assert_eq!(q.first().unwrap().to_string(), "3 s");
        assert_eq!(q.last().unwrap().to_string(), "2 s");
        assert!(!q.is_scalar());
        assert!(Quantity::scalar(1.0, Unit::second()).is_scalar());
        assert_eq!(Quantity::from_vec(vec![1.0, 2.0], Unit::dimensionless()).to_string(), "[1, 2]");
    }
}
