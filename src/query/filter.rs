//! Element filters: spatial and identity conditions narrowing an element
//! selection.
//!
//! Coordinates enter in GeoJSON order (`x` = longitude, `y` = latitude) and
//! leave in engine order (latitude first). [`to_engine_order`] is the only
//! place that swap happens.

use geo_types::{Coord, LineString};
use std::fmt;

use crate::error::BuildError;
use crate::utils::{format_coord, format_number, join_display};

/// Rectangular area as `(south, west, north, east)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// All four edges must be finite.
    pub fn validate(&self) -> Result<(), BuildError> {
        check_finite("bounding box", [self.south, self.west, self.north, self.east])
    }

    pub fn clause(&self) -> String {
        join_display(
            [self.south, self.west, self.north, self.east].map(format_coord),
            ",",
        )
    }
}

/// Membership recursion inside an element filter, e.g. `node(w)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRecurse {
    /// Child nodes of ways in the input set.
    Ways,
    /// Node/way/relation members of relations in the input set.
    Relations,
    /// Parent ways of nodes in the input set.
    BackNodes,
    /// Relations with way members in the input set.
    BackWays,
    /// Parent relations of relations in the input set.
    BackRelations,
}

impl MemberRecurse {
    pub fn symbol(&self) -> &'static str {
        match self {
            MemberRecurse::Ways => "w",
            MemberRecurse::Relations => "r",
            MemberRecurse::BackNodes => "bn",
            MemberRecurse::BackWays => "bw",
            MemberRecurse::BackRelations => "br",
        }
    }
}

/// Everything within `radius` metres of the ring's points, optionally of
/// the elements in a named input set.
#[derive(Debug, Clone, PartialEq)]
pub struct Around {
    pub radius: f64,
    pub ring: LineString<f64>,
    pub input_set: Option<String>,
}

/// Filter arguments, one typed record per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    BoundingBox(BoundingBox),
    Recurse(MemberRecurse),
    Id(Vec<i64>),
    Around(Around),
    Polygon(LineString<f64>),
    Area(Vec<i64>),
}

impl FilterKind {
    fn validate(&self) -> Result<(), BuildError> {
        match self {
            FilterKind::BoundingBox(bbox) => bbox.validate(),
            FilterKind::Recurse(_) => Ok(()),
            FilterKind::Id(ids) | FilterKind::Area(ids) => {
                if ids.is_empty() {
                    return Err(BuildError::EmptyIdList(self.name()));
                }
                Ok(())
            }
            FilterKind::Around(around) => {
                check_ring(self.name(), &around.ring)?;
                check_finite(self.name(), [around.radius])
            }
            FilterKind::Polygon(ring) => check_ring(self.name(), ring),
        }
    }

    /// Clause text between the element's parentheses.
    fn clause(&self) -> String {
        match self {
            FilterKind::BoundingBox(bbox) => bbox.clause(),
            // The closing parenthesis belongs to the clause; the element adds its own pair.
            FilterKind::Recurse(direction) => format!("{})", direction.symbol()),
            FilterKind::Id(ids) => format!("id:{}", join_display(ids, ",")),
            FilterKind::Around(around) => {
                let prefix = match &around.input_set {
                    Some(set) => format!("around.{set}"),
                    None => "around".to_string(),
                };
                format!(
                    "{prefix}:{},{}",
                    format_number(around.radius),
                    join_coords(&around.ring, ",")
                )
            }
            FilterKind::Polygon(ring) => format!("poly:\"{}\"", join_coords(ring, " ")),
            FilterKind::Area(ids) => format!("area:{}", join_display(ids, ",")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::BoundingBox(_) => "bounding box",
            FilterKind::Recurse(_) => "recurse",
            FilterKind::Id(_) => "id",
            FilterKind::Around(_) => "around",
            FilterKind::Polygon(_) => "polygon",
            FilterKind::Area(_) => "area",
        }
    }
}

/// A validated filter together with its clause text.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFilter {
    kind: FilterKind,
    clause: String,
}

impl ElementFilter {
    pub fn new(kind: FilterKind) -> Result<Self, BuildError> {
        kind.validate()?;
        Ok(Self::rendered(kind))
    }

    /// Only for kinds that cannot fail validation.
    fn rendered(kind: FilterKind) -> Self {
        Self {
            clause: kind.clause(),
            kind,
        }
    }

    pub fn bbox(south: f64, west: f64, north: f64, east: f64) -> Result<Self, BuildError> {
        Self::try_from(BoundingBox::new(south, west, north, east))
    }

    pub fn recurse(direction: MemberRecurse) -> Self {
        Self::rendered(FilterKind::Recurse(direction))
    }

    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Result<Self, BuildError> {
        Self::new(FilterKind::Id(ids.into_iter().collect()))
    }

    pub fn around(
        radius: f64,
        ring: LineString<f64>,
        input_set: Option<&str>,
    ) -> Result<Self, BuildError> {
        Self::new(FilterKind::Around(Around {
            radius,
            ring,
            input_set: input_set.map(str::to_string),
        }))
    }

    pub fn polygon(ring: LineString<f64>) -> Result<Self, BuildError> {
        Self::new(FilterKind::Polygon(ring))
    }

    pub fn area(ids: impl IntoIterator<Item = i64>) -> Result<Self, BuildError> {
        Self::new(FilterKind::Area(ids.into_iter().collect()))
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    /// Set consumed by the filter: recursion and unnamed `around` read the
    /// prior implicit result, a named `around` reads its set.
    pub fn reads(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Recurse(_) => Some("_"),
            FilterKind::Around(around) => around.input_set.as_deref(),
            _ => None,
        }
    }
}

impl TryFrom<BoundingBox> for ElementFilter {
    type Error = BuildError;

    fn try_from(bbox: BoundingBox) -> Result<Self, Self::Error> {
        Self::new(FilterKind::BoundingBox(bbox))
    }
}

impl fmt::Display for ElementFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.clause)
    }
}

/// GeoJSON `(lon, lat)` ring to engine `(lat, lon)` pairs, order preserved.
pub fn to_engine_order(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c: &Coord<f64>| [c.y, c.x]).collect()
}

fn check_ring(kind: &'static str, ring: &LineString<f64>) -> Result<(), BuildError> {
    if ring.0.is_empty() {
        return Err(BuildError::EmptyRing(kind));
    }
    check_finite(kind, ring.coords().flat_map(|c| [c.x, c.y]))
}

fn check_finite(
    kind: &'static str,
    values: impl IntoIterator<Item = f64>,
) -> Result<(), BuildError> {
    if values.into_iter().all(f64::is_finite) {
        Ok(())
    } else {
        Err(BuildError::NonFinite(kind))
    }
}

fn join_coords(ring: &LineString<f64>, delim: &str) -> String {
    join_display(
        to_engine_order(ring).into_iter().flatten().map(format_coord),
        delim,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> LineString<f64> {
        LineString::from(vec![
            (145.10180044651912, -37.8444294644357),
            (145.10180044651912, -37.845678389372324),
            (145.10359037007055, -37.845678389372324),
            (145.10359037007055, -37.8444294644357),
            (145.10180044651912, -37.8444294644357),
        ])
    }

    #[test]
    fn bbox_clause() {
        let filter = ElementFilter::bbox(-37.84, 145.10, -37.84, 145.11).unwrap();
        assert_eq!(filter.clause(), "-37.84,145.10,-37.84,145.11");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert_eq!(
            ElementFilter::bbox(f64::NAN, 0.0, 1.0, f64::INFINITY).unwrap_err(),
            BuildError::NonFinite("bounding box")
        );

        let ring = LineString::from(vec![(145.1, -37.8), (f64::NEG_INFINITY, -37.9)]);
        assert_eq!(
            ElementFilter::polygon(ring).unwrap_err(),
            BuildError::NonFinite("polygon")
        );

        let center = LineString::from(vec![(145.1, -37.8)]);
        assert_eq!(
            ElementFilter::around(f64::NAN, center, None).unwrap_err(),
            BuildError::NonFinite("around")
        );
    }

    #[test]
    fn shortcut_constructors_match_new() {
        let bbox = BoundingBox::new(50.6, 7.0, 50.8, 7.3);
        assert_eq!(
            ElementFilter::try_from(bbox).unwrap(),
            ElementFilter::new(FilterKind::BoundingBox(bbox)).unwrap()
        );
        for direction in [MemberRecurse::Ways, MemberRecurse::BackNodes] {
            assert_eq!(
                ElementFilter::recurse(direction),
                ElementFilter::new(FilterKind::Recurse(direction)).unwrap()
            );
        }
    }

    #[test]
    fn recurse_clause_carries_closing_paren() {
        assert_eq!(ElementFilter::recurse(MemberRecurse::Ways).clause(), "w)");
        assert_eq!(
            ElementFilter::recurse(MemberRecurse::BackRelations).clause(),
            "br)"
        );
        assert_eq!(
            ElementFilter::recurse(MemberRecurse::Relations).reads(),
            Some("_")
        );
    }

    #[test]
    fn id_and_area_clauses() {
        assert_eq!(ElementFilter::ids([1, 2, 3]).unwrap().clause(), "id:1,2,3");
        assert_eq!(ElementFilter::area([3600062422]).unwrap().clause(), "area:3600062422");
    }

    #[test]
    fn empty_id_lists_are_rejected() {
        assert_eq!(
            ElementFilter::ids(Vec::new()).unwrap_err(),
            BuildError::EmptyIdList("id")
        );
        assert_eq!(
            ElementFilter::area(Vec::new()).unwrap_err(),
            BuildError::EmptyIdList("area")
        );
    }

    #[test]
    fn around_swaps_to_lat_lon() {
        let ring = LineString::from(vec![(144.930127, -37.740347)]);
        let filter = ElementFilter::around(5.0, ring.clone(), None).unwrap();
        assert_eq!(filter.clause(), "around:5,-37.740347,144.930127");
        assert_eq!(filter.reads(), None);

        let named = ElementFilter::around(12.5, ring, Some("stops")).unwrap();
        assert_eq!(named.clause(), "around.stops:12.5,-37.740347,144.930127");
        assert_eq!(named.reads(), Some("stops"));
    }

    #[test]
    fn polygon_uses_space_separated_lat_lon() {
        let ring = LineString::from(vec![(145.1, -37.8), (145.2, -37.9)]);
        let filter = ElementFilter::polygon(ring).unwrap();
        assert_eq!(filter.clause(), "poly:\"-37.80 145.10 -37.90 145.20\"");
    }

    #[test]
    fn empty_rings_are_rejected() {
        let empty = LineString::<f64>::new(Vec::new());
        assert_eq!(
            ElementFilter::polygon(empty.clone()).unwrap_err(),
            BuildError::EmptyRing("polygon")
        );
        assert_eq!(
            ElementFilter::around(10.0, empty, None).unwrap_err(),
            BuildError::EmptyRing("around")
        );
    }

    #[test]
    fn engine_order_swap_is_self_inverse() {
        let ring = square();
        let swapped = to_engine_order(&ring);
        assert_eq!(swapped[1], [-37.845678389372324, 145.10180044651912]);

        let back: LineString<f64> = swapped
            .iter()
            .map(|[lat, lon]| Coord { x: *lon, y: *lat })
            .collect::<Vec<_>>()
            .into();
        assert_eq!(back, ring);
    }
}
