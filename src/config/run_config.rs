use crate::config::identity::{ContentHashIdentity, RunId, RunIdentity};
use crate::config::ini::IniDocument;
use crate::config::vector::{ConfigVector, VectorField};
use crate::io::fileset::ImageDate;
use crate::types::{FireError, FireResult, GeoWindow};
use std::path::{Path, PathBuf};

const IN_DIRECTORY: &str = "InDirectory";
const ACTIVE_FIRE: &str = "ActiveFire";
const THRESHOLDS: &str = "Thresholds";
const CONFIRM_BURN: &str = "ConfirmBurnParameters";
const OUTPUT_FLAGS: &str = "OutputFlags";
const IMAGE_DATES: &str = "ImageDates";
const DATABASE_INFO: &str = "DataBaseInfo";
const GEOGRAPHIC_WINDOW: &str = "GeographicWindow";

/// PostgreSQL connection and namespace for one run
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: Option<String>,
    pub schema: String,
}

impl DatabaseInfo {
    /// libpq-style connection string
    pub fn connection_params(&self) -> String {
        match &self.host {
            Some(host) => format!(
                "host={} dbname={} user={} password={}",
                host, self.name, self.user, self.password
            ),
            None => format!("dbname={} user={} password={}", self.name, self.user, self.password),
        }
    }
}

/// Complete configuration of one thresholding run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Directory holding every scene file
    pub base_dir: PathBuf,
    /// Include 375 m (VF375) active fire detections
    pub use_375af: bool,
    /// Include 750 m (AVAFO) active fire detections
    pub use_750af: bool,
    /// Maximum high-confidence 375 m pixels per row before the row is suppressed
    pub limit_375: Option<usize>,
    pub vector: ConfigVector,
    pub text_output: bool,
    pub shape_output: bool,
    pub database_output: bool,
    /// Run output directory
    pub shape_dir: PathBuf,
    /// Directory of the PostgreSQL client tools
    pub postgres_bin: PathBuf,
    /// Scene identifiers, `dYYYYMMDD_tHHMMSSs`
    pub image_dates: Vec<String>,
    pub database: DatabaseInfo,
    pub window: Option<GeoWindow>,
    pub run_id: RunId,
}

impl RunConfig {
    /// Load a configuration file, identifying the run by its content hash
    pub fn load<P: AsRef<Path>>(path: P) -> FireResult<Self> {
        Self::load_with_identity(path, &ContentHashIdentity)
    }

    pub fn load_with_identity<P: AsRef<Path>>(path: P, identity: &dyn RunIdentity) -> FireResult<Self> {
        log::info!("Loading run configuration: {}", path.as_ref().display());
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_ini_str(&text, identity)
    }

    pub fn from_ini_str(text: &str, identity: &dyn RunIdentity) -> FireResult<Self> {
        Self::from_ini(&IniDocument::parse(text)?, identity)
    }

    pub fn from_ini(ini: &IniDocument, identity: &dyn RunIdentity) -> FireResult<Self> {
        let vector = ConfigVector {
            m07_ub: parse_float(ini, THRESHOLDS, "M07UB")?,
            m08_lb: parse_float(ini, THRESHOLDS, "M08LB")?,
            m08_ub: parse_float(ini, THRESHOLDS, "M08UB")?,
            m10_lb: parse_float(ini, THRESHOLDS, "M10LB")?,
            m10_ub: parse_float(ini, THRESHOLDS, "M10UB")?,
            m11_lb: parse_float(ini, THRESHOLDS, "M11LB")?,
            rth_sub: parse_float(ini, THRESHOLDS, "RthSub")?,
            rth: parse_float(ini, THRESHOLDS, "Rth")?,
            rth_lb: parse_float(ini, THRESHOLDS, "RthLB")?,
            max_sol_zen: parse_float(ini, THRESHOLDS, "MaxSolZen")?,
            temporal_proximity: parse_int(ini, CONFIRM_BURN, "TemporalProximity")?,
            spatial_proximity: parse_int(ini, CONFIRM_BURN, "SpatialProximity")?,
        };

        let limit_375 = match ini.get(ACTIVE_FIRE, "limit375") {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|e| {
                FireError::config(ACTIVE_FIRE, "limit375", format!("'{}' is not a count: {}", value, e))
            })?),
            None => None,
        };

        let window = if ini.has_section(GEOGRAPHIC_WINDOW) {
            Some(GeoWindow {
                north: parse_float(ini, GEOGRAPHIC_WINDOW, "North")?,
                south: parse_float(ini, GEOGRAPHIC_WINDOW, "South")?,
                east: parse_float(ini, GEOGRAPHIC_WINDOW, "East")?,
                west: parse_float(ini, GEOGRAPHIC_WINDOW, "West")?,
            })
        } else {
            None
        };

        let image_dates = ini
            .require(IMAGE_DATES, "ImageDates")?
            .split(',')
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect();

        let run_id = identity.assign(&vector);
        let database = DatabaseInfo {
            name: ini.require(DATABASE_INFO, "DataBaseName")?.to_string(),
            user: ini.require(DATABASE_INFO, "UserName")?.to_string(),
            password: ini.require(DATABASE_INFO, "password")?.to_string(),
            host: ini.get(DATABASE_INFO, "Host").map(str::to_string),
            schema: ini
                .get(DATABASE_INFO, "Schema")
                .map(str::to_string)
                .unwrap_or_else(|| run_id.schema_name()),
        };

        Ok(Self {
            base_dir: PathBuf::from(ini.require(IN_DIRECTORY, "BaseDirectory")?),
            use_375af: parse_flag(ini, ACTIVE_FIRE, "use375af")?,
            use_750af: parse_flag(ini, ACTIVE_FIRE, "use750af")?,
            limit_375,
            vector,
            text_output: parse_flag(ini, OUTPUT_FLAGS, "TextFile")?,
            shape_output: parse_flag(ini, OUTPUT_FLAGS, "ShapeFile")?,
            database_output: parse_flag(ini, OUTPUT_FLAGS, "PostGIS")?,
            shape_dir: PathBuf::from(ini.require(OUTPUT_FLAGS, "OutShapeDir")?),
            postgres_bin: PathBuf::from(ini.require(OUTPUT_FLAGS, "PostgresqlBin")?),
            image_dates,
            database,
            window,
            run_id,
        })
    }

    /// Equivalent ini document; floats use two decimals when that is exact
    pub fn to_ini(&self) -> IniDocument {
        let mut ini = IniDocument::new();

        ini.set(IN_DIRECTORY, "BaseDirectory", self.base_dir.display().to_string());

        ini.set(ACTIVE_FIRE, "use375af", flag(self.use_375af));
        ini.set(ACTIVE_FIRE, "use750af", flag(self.use_750af));
        if let Some(limit) = self.limit_375 {
            ini.set(ACTIVE_FIRE, "limit375", limit.to_string());
        }

        for field in VectorField::FLOATS {
            ini.set(THRESHOLDS, field.name(), format_float(self.vector.get(field)));
        }
        for field in VectorField::INTEGERS {
            ini.set(CONFIRM_BURN, field.name(), format!("{}", self.vector.get(field) as i64));
        }

        ini.set(OUTPUT_FLAGS, "TextFile", flag(self.text_output));
        ini.set(OUTPUT_FLAGS, "ShapeFile", flag(self.shape_output));
        ini.set(OUTPUT_FLAGS, "PostGIS", flag(self.database_output));
        ini.set(OUTPUT_FLAGS, "OutShapeDir", self.shape_dir.display().to_string());
        ini.set(OUTPUT_FLAGS, "PostgresqlBin", self.postgres_bin.display().to_string());

        ini.set(IMAGE_DATES, "ImageDates", self.image_dates.join(","));

        ini.set(DATABASE_INFO, "DataBaseName", self.database.name.as_str());
        ini.set(DATABASE_INFO, "UserName", self.database.user.as_str());
        ini.set(DATABASE_INFO, "password", self.database.password.as_str());
        if let Some(host) = &self.database.host {
            ini.set(DATABASE_INFO, "Host", host.as_str());
        }
        ini.set(DATABASE_INFO, "Schema", self.database.schema.as_str());

        if let Some(window) = &self.window {
            ini.set(GEOGRAPHIC_WINDOW, "North", format_float(window.north));
            ini.set(GEOGRAPHIC_WINDOW, "South", format_float(window.south));
            ini.set(GEOGRAPHIC_WINDOW, "East", format_float(window.east));
            ini.set(GEOGRAPHIC_WINDOW, "West", format_float(window.west));
        }

        ini
    }

    pub fn to_ini_string(&self) -> String {
        self.to_ini().to_string()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> FireResult<()> {
        log::debug!("Saving run {} configuration to {}", self.run_id, path.as_ref().display());
        std::fs::write(path, self.to_ini_string())?;
        Ok(())
    }

    /// The numeric parameter vector of this run
    pub fn get_vector(&self) -> ConfigVector {
        self.vector
    }

    /// Build a new run from `vector` and the fixed settings of `template`.
    ///
    /// The run id comes from `identity`; the output directory and schema are
    /// derived from it.
    pub fn merge_into_template(
        vector: ConfigVector,
        template: &RunConfig,
        identity: &dyn RunIdentity,
    ) -> RunConfig {
        let run_id = identity.assign(&vector);
        Self::merge_with_run_id(vector, template, run_id)
    }

    /// As [`RunConfig::merge_into_template`] with an explicit run id
    pub fn merge_with_run_id(vector: ConfigVector, template: &RunConfig, run_id: RunId) -> RunConfig {
        let mut merged = template.clone();
        merged.vector = vector;
        merged.run_id = run_id;
        merged.shape_dir = run_directory(&template.shape_dir, run_id);
        merged.database.schema = run_id.schema_name();
        merged
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    /// Image dates parsed and in chronological order
    pub fn sorted_image_dates(&self) -> FireResult<Vec<ImageDate>> {
        let mut dates = self
            .image_dates
            .iter()
            .map(|token| ImageDate::parse(token))
            .collect::<FireResult<Vec<_>>>()?;
        dates.sort();
        Ok(dates)
    }

    /// Temporal proximity as an SQL interval literal
    pub fn temporal_interval(&self) -> String {
        format!("{} days", self.vector.temporal_proximity)
    }
}

/// Sibling of `template_dir` named after the run id
pub fn run_directory(template_dir: &Path, run_id: RunId) -> PathBuf {
    match template_dir.parent() {
        Some(parent) => parent.join(run_id.to_string()),
        None => PathBuf::from(run_id.to_string()),
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "y"
    } else {
        "n"
    }
}

/// Two decimals when that reads back exactly, else the shortest exact form
fn format_float(value: f64) -> String {
    let short = format!("{:4.2}", value);
    if short.trim().parse::<f64>().ok() == Some(value) {
        short
    } else {
        format!("{:?}", value)
    }
}

fn parse_flag(ini: &IniDocument, section: &str, key: &str) -> FireResult<bool> {
    let value = ini.require(section, key)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        other => Err(FireError::config(section, key, format!("'{}' is not a y/n flag", other))),
    }
}

fn parse_float(ini: &IniDocument, section: &str, key: &str) -> FireResult<f64> {
    let value = ini.require(section, key)?;
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| FireError::config(section, key, format!("'{}' is not a number: {}", value, e)))
}

fn parse_int(ini: &IniDocument, section: &str, key: &str) -> FireResult<i64> {
    let value = ini.require(section, key)?;
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| FireError::config(section, key, format!("'{}' is not an integer: {}", value, e)))
}
