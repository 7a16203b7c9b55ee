//! Canned street-network queries.
//!
//! Each preset names the way and relation tag predicates that select one
//! kind of network (drivable roads, footpaths, rail, ...). The builders wrap
//! them in the standard query shape: ways and relations in an area plus
//! their members, printed with `out body;` and optionally `out meta;`.

use clap::ValueEnum;
use geo_types::{Coord, LineString};

use crate::error::{BuildError, PresetError};
use crate::geocode::Geocoder;
use crate::query::{
    BoundingBox, ElementFilter, ElementStatement, ElementType, OutStatement, OutputFormat,
    RecurseDirection, RecurseStatement, Sequence, Setting, SettingsStatement, Statement,
    TagPredicate, UnionStatement, Verbosity,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PresetNetwork {
    #[default]
    Drive,
    DriveMainroads,
    DriveService,
    Walk,
    Bike,
    All,
    AllPrivate,
    None,
    Rail,
}

const DRIVE_EXCLUDED_SERVICE: &str = "parking|parking_aisle|driveway|private|emergency_access";
const NON_NETWORK_HIGHWAYS: &str = "proposed|construction|abandoned|platform|raceway";

impl PresetNetwork {
    pub fn way_predicates(&self) -> Vec<TagPredicate> {
        use TagPredicate as T;

        let highway = T::exists("highway");
        let no_area = T::regex_not_match("area", "yes");
        let public = T::regex_not_match("access", "private");
        let public_service = T::regex_not_match("service", "private");

        match self {
            PresetNetwork::Drive => vec![
                highway,
                no_area,
                T::regex_not_match(
                    "highway",
                    "cycleway|footway|path|pedestrian|steps|track|corridor|elevator|escalator|proposed|construction|bridleway|abandoned|platform|raceway|service",
                ),
                T::regex_not_match("motor_vehicle", "no"),
                T::regex_not_match("motorcar", "no"),
                public,
                T::regex_not_match("service", DRIVE_EXCLUDED_SERVICE),
            ],
            PresetNetwork::DriveMainroads => vec![
                highway,
                no_area,
                T::regex_not_match(
                    "highway",
                    "cycleway|footway|path|pedestrian|steps|track|corridor|elevator|escalator|proposed|construction|bridleway|abandoned|platform|raceway|service|residential",
                ),
                T::regex_not_match("motor_vehicle", "no"),
                T::regex_not_match("motorcar", "no"),
                public,
                T::regex_not_match("service", DRIVE_EXCLUDED_SERVICE),
            ],
            PresetNetwork::DriveService => vec![
                highway,
                no_area,
                T::regex_not_match(
                    "highway",
                    "cycleway|footway|path|pedestrian|steps|track|corridor|elevator|escalator|proposed|construction|bridleway|abandoned|platform|raceway",
                ),
                T::regex_not_match("motor_vehicle", "no"),
                T::regex_not_match("motorcar", "no"),
                public,
                T::regex_not_match("service", "parking|parking_aisle|private|emergency_access"),
            ],
            PresetNetwork::Walk => vec![
                highway,
                no_area,
                T::regex_not_match(
                    "highway",
                    "cycleway|motor|proposed|construction|abandoned|platform|raceway",
                ),
                T::regex_not_match("foot", "no"),
                public,
                public_service,
            ],
            PresetNetwork::Bike => vec![
                highway,
                no_area,
                T::regex_not_match(
                    "highway",
                    "footway|steps|corridor|elevator|escalator|motor|proposed|construction|abandoned|platform|raceway",
                ),
                T::regex_not_match("bicycle", "no"),
                public,
                public_service,
            ],
            PresetNetwork::All => vec![
                highway,
                no_area,
                T::regex_not_match("highway", NON_NETWORK_HIGHWAYS),
                public,
                public_service,
            ],
            PresetNetwork::AllPrivate => vec![
                highway,
                no_area,
                T::regex_not_match("highway", NON_NETWORK_HIGHWAYS),
            ],
            PresetNetwork::None => vec![highway],
            PresetNetwork::Rail => vec![
                T::exists("railway"),
                T::regex_not_match("highway", NON_NETWORK_HIGHWAYS),
            ],
        }
    }

    /// Turn-restriction relations for the driving presets, nothing otherwise.
    pub fn relation_predicates(&self) -> Vec<TagPredicate> {
        match self {
            PresetNetwork::Drive
            | PresetNetwork::DriveMainroads
            | PresetNetwork::DriveService
            | PresetNetwork::All
            | PresetNetwork::AllPrivate => vec![
                TagPredicate::exists("restriction"),
                TagPredicate::not_exists("conditional"),
                TagPredicate::not_exists("hgv"),
                TagPredicate::equals("type", "restriction"),
            ],
            PresetNetwork::Walk
            | PresetNetwork::Bike
            | PresetNetwork::None
            | PresetNetwork::Rail => Vec::new(),
        }
    }
}

/// Where to look.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArea {
    BoundingBox(BoundingBox),
    /// `radius` metres around `center` (`x` = lon, `y` = lat).
    Radius { radius: f64, center: Coord<f64> },
    /// One or more rings in GeoJSON order; each becomes its own pair of
    /// way/relation selections inside the union.
    Polygon(Vec<LineString<f64>>),
    /// Resolved through a [`Geocoder`].
    PlaceName(String),
}

/// Predicates and output shape shared by every preset query.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetQuery {
    pub way_predicates: Vec<TagPredicate>,
    pub relation_predicates: Vec<TagPredicate>,
    pub include_metadata: bool,
    pub format: OutputFormat,
    /// Header selection, required for csv.
    pub format_options: Option<String>,
}

impl PresetQuery {
    pub fn new(network: PresetNetwork, format: OutputFormat) -> Self {
        Self {
            way_predicates: network.way_predicates(),
            relation_predicates: network.relation_predicates(),
            include_metadata: false,
            format,
            format_options: None,
        }
    }

    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    pub fn with_format_options(mut self, options: impl Into<String>) -> Self {
        self.format_options = Some(options.into());
        self
    }

    /// Build the query for `area`. Place names go through `geocoder`;
    /// geocoding errors are returned, not retried.
    pub fn build(
        &self,
        area: &QueryArea,
        geocoder: &dyn Geocoder,
    ) -> Result<Sequence, PresetError> {
        match area {
            QueryArea::BoundingBox(bbox) => Ok(self.by_bounding_box(bbox)?),
            QueryArea::Radius { radius, center } => Ok(self.by_radius(*radius, *center)?),
            QueryArea::Polygon(rings) => Ok(self.by_polygon(rings)?),
            QueryArea::PlaceName(place) => {
                let ring = geocoder.resolve(place)?;
                Ok(self.by_polygon(&[ring])?)
            }
        }
    }

    pub fn by_bounding_box(&self, bbox: &BoundingBox) -> Result<Sequence, BuildError> {
        let filter = ElementFilter::try_from(*bbox)?;
        let settings =
            SettingsStatement::new([self.output_setting()?, Setting::global_bbox(bbox)?]);
        let union = UnionStatement::new("_", self.selection(&filter))?;
        Ok(self.finish(settings, union))
    }

    pub fn by_radius(
        &self,
        radius: f64,
        center: Coord<f64>,
    ) -> Result<Sequence, BuildError> {
        let filter = ElementFilter::around(radius, LineString::new(vec![center]), None)?;
        let settings = SettingsStatement::new([self.output_setting()?]);
        let union = UnionStatement::new("_", self.selection(&filter))?;
        Ok(self.finish(settings, union))
    }

    pub fn by_polygon(
        &self,
        rings: &[LineString<f64>],
    ) -> Result<Sequence, BuildError> {
        let settings = SettingsStatement::new([self.output_setting()?]);
        let mut union = UnionStatement::new("_", Vec::new())?;
        for ring in rings {
            let filter = ElementFilter::polygon(ring.clone())?;
            union.append(self.selection(&filter))?;
        }
        Ok(self.finish(settings, union))
    }

    fn output_setting(&self) -> Result<Setting, BuildError> {
        Setting::output(self.format, self.format_options.as_deref())
    }

    /// `way...(filter);<;relation...(filter);<;`
    fn selection(&self, filter: &ElementFilter) -> [Statement; 4] {
        let way = ElementStatement::new(
            ElementType::Way,
            self.way_predicates.clone(),
            Some(filter.clone()),
        );
        let relation = ElementStatement::new(
            ElementType::Relation,
            self.relation_predicates.clone(),
            Some(filter.clone()),
        );
        [
            way.into(),
            RecurseStatement::new(RecurseDirection::Down).into(),
            relation.into(),
            RecurseStatement::new(RecurseDirection::Down).into(),
        ]
    }

    fn finish(&self, settings: SettingsStatement, union: UnionStatement) -> Sequence {
        let mut sequence = Sequence::new([
            settings.into(),
            union.into(),
            OutStatement::new(Verbosity::Body).into(),
        ]);
        if self.include_metadata {
            sequence.append([OutStatement::new(Verbosity::Meta).into()]);
        }
        sequence
    }
}
