use std::fmt;

/// Classification tag identifying which statistical/administrative scheme and
/// granularity a region belongs to (ASGS 2021 structures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Country,              // Synthetic root, whole of Australia
    State,                // STE: states and territories
    Gccsa,                // GCC: greater capital city statistical areas
    Sa4,                  // SA4 -> GCC
    Sa3,                  // SA3 -> SA4
    Sa2,                  // SA2 -> SA3
    Sa1,                  // SA1 -> SA2 (no published names)
    MeshBlock,            // MB -> SA1 (no published names)
    Lga,                  // Local government areas
    Ced,                  // Commonwealth electoral divisions
    Poa,                  // Postal areas
    IndigenousRegion,     // IREG
    IndigenousArea,       // IARE -> IREG
    IndigenousLocality,   // ILOC -> IARE
    Sua,                  // Significant urban areas
    SectionOfState,       // SOS
    SectionOfStateRange,  // SOSR -> SOS
    UrbanCentreLocality,  // UCL -> SOSR
    TourismRegion,        // TR
}

impl Level {
    /// All levels, in canonical nesting-rank order.
    pub fn all() -> [Level; 19] {
        [
            Level::Country,
            Level::State,
            Level::Gccsa,
            Level::Sa4,
            Level::Sa3,
            Level::Sa2,
            Level::Sa1,
            Level::MeshBlock,
            Level::Lga,
            Level::Ced,
            Level::Poa,
            Level::IndigenousRegion,
            Level::IndigenousArea,
            Level::IndigenousLocality,
            Level::Sua,
            Level::SectionOfState,
            Level::SectionOfStateRange,
            Level::UrbanCentreLocality,
            Level::TourismRegion,
        ]
    }

    /// Short ASGS tag, matching the prefix of the dataset code columns.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Level::Country => "AUS",
            Level::State => "STE",
            Level::Gccsa => "GCC",
            Level::Sa4 => "SA4",
            Level::Sa3 => "SA3",
            Level::Sa2 => "SA2",
            Level::Sa1 => "SA1",
            Level::MeshBlock => "MB",
            Level::Lga => "LGA",
            Level::Ced => "CED",
            Level::Poa => "POA",
            Level::IndigenousRegion => "IREG",
            Level::IndigenousArea => "IARE",
            Level::IndigenousLocality => "ILOC",
            Level::Sua => "SUA",
            Level::SectionOfState => "SOS",
            Level::SectionOfStateRange => "SOSR",
            Level::UrbanCentreLocality => "UCL",
            Level::TourismRegion => "TR",
        }
    }

    /// Parse a level from a query tag, e.g. `"SA3"` or `"lga"`.
    pub fn from_tag(tag: &str) -> Option<Level> {
        Level::all().into_iter().find(|level| level.as_tag().eq_ignore_ascii_case(tag))
    }

    /// Derive the level from a dataset code column, e.g. `"SA3_CODE21"`.
    ///
    /// The classification tag is the column prefix before `_CODE`; the year
    /// suffix after it is ignored.
    pub fn from_code_column(column: &str) -> Option<Level> {
        let prefix = column.split("_CODE").next()?;
        Level::all().into_iter().find(|level| level.as_tag() == prefix)
    }

    /// Whether the ABS publishes names for regions at this level. The finest
    /// granularities (SA1, mesh block) are code-only.
    pub fn has_published_name(&self) -> bool {
        !matches!(self, Level::Sa1 | Level::MeshBlock)
    }

    /// Canonical nesting rank, used to sort tabular query results by level.
    ///
    /// This is a display ordering, not a graph invariant: the loading
    /// configuration decides which levels nest under which, and some levels
    /// attach under more than one parent scheme.
    pub fn rank(&self) -> u8 {
        Level::all().iter().position(|level| level == self).unwrap_or(u8::MAX as usize) as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}
