use crate::types::{FireError, FireResult, PixelSize};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Acquisition identifier of a scene, e.g. `d20140715_t1921193`.
///
/// The trailing digit after the seconds (tenths) is kept in the token for
/// file lookup but does not take part in the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageDate {
    datetime: NaiveDateTime,
    token: String,
}

impl ImageDate {
    pub fn parse(token: &str) -> FireResult<Self> {
        let token = token.trim();
        let invalid = || FireError::InvalidImageDate(token.to_string());

        // dYYYYMMDD_tHHMMSS followed by any number of sub-second digits
        let (day, time) = token
            .strip_prefix('d')
            .and_then(|rest| rest.split_once("_t"))
            .ok_or_else(invalid)?;
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if day.len() != 8 || time.len() < 6 || !all_digits(day) || !all_digits(time) {
            return Err(invalid());
        }

        let stamp = format!("{}{}", day, &time[..6]);
        let datetime = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S").map_err(|_| invalid())?;
        Ok(Self {
            datetime,
            token: token.to_string(),
        })
    }

    /// Image date of a scene file named `PREFIX_npp_dYYYYMMDD_tHHMMSSs_...`
    pub fn from_filename(filename: &str) -> FireResult<Self> {
        let parts: Vec<&str> = filename.split('_').collect();
        if parts.len() < 4 {
            return Err(FireError::InvalidImageDate(filename.to_string()));
        }
        Self::parse(&format!("{}_{}", parts[2], parts[3]))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    /// `YYYYmmdd_HHMMSS`, used in output file names
    pub fn out_date(&self) -> String {
        self.datetime.format("%Y%m%d_%H%M%S").to_string()
    }

    /// `YYYY-mm-dd HH:MM:SS`, used for database collection dates
    pub fn sql_date(&self) -> String {
        self.datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl std::fmt::Display for ImageDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token)
    }
}

/// Product families making up one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenePrefix {
    Svm07,
    Svm08,
    Svm10,
    Svm11,
    /// 750 m terrain-corrected geolocation
    Gmtco,
    /// 375 m terrain-corrected geolocation
    Gitco,
    /// 375 m active fire (HDF4)
    Vf375,
    /// 750 m active fire
    Avafo,
}

impl ScenePrefix {
    pub const REFLECTANCE: [ScenePrefix; 4] = [
        ScenePrefix::Svm07,
        ScenePrefix::Svm08,
        ScenePrefix::Svm10,
        ScenePrefix::Svm11,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenePrefix::Svm07 => "SVM07",
            ScenePrefix::Svm08 => "SVM08",
            ScenePrefix::Svm10 => "SVM10",
            ScenePrefix::Svm11 => "SVM11",
            ScenePrefix::Gmtco => "GMTCO",
            ScenePrefix::Gitco => "GITCO",
            ScenePrefix::Vf375 => "VF375",
            ScenePrefix::Avafo => "AVAFO",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ScenePrefix::Vf375 => "hdf",
            _ => "h5",
        }
    }

    /// Dataset holding the primary array inside the product file
    pub fn dataset(&self) -> &'static str {
        match self {
            ScenePrefix::Svm07 => "All_Data/VIIRS-M7-SDR_All/Reflectance",
            ScenePrefix::Svm08 => "All_Data/VIIRS-M8-SDR_All/Reflectance",
            ScenePrefix::Svm10 => "All_Data/VIIRS-M10-SDR_All/Reflectance",
            ScenePrefix::Svm11 => "All_Data/VIIRS-M11-SDR_All/Reflectance",
            ScenePrefix::Gmtco => "All_Data/VIIRS-MOD-GEO-TC_All",
            ScenePrefix::Gitco => "All_Data/VIIRS-IMG-GEO-TC_All",
            ScenePrefix::Vf375 => "fire mask",
            ScenePrefix::Avafo => "All_Data/VIIRS-AF-EDR_All/fireMask",
        }
    }

    /// Dataset holding the `[scale, offset]` reflectance factors
    pub fn factors_dataset(&self) -> Option<&'static str> {
        match self {
            ScenePrefix::Svm07 => Some("All_Data/VIIRS-M7-SDR_All/ReflectanceFactors"),
            ScenePrefix::Svm08 => Some("All_Data/VIIRS-M8-SDR_All/ReflectanceFactors"),
            ScenePrefix::Svm10 => Some("All_Data/VIIRS-M10-SDR_All/ReflectanceFactors"),
            ScenePrefix::Svm11 => Some("All_Data/VIIRS-M11-SDR_All/ReflectanceFactors"),
            _ => None,
        }
    }

    pub fn pixel_size(&self) -> PixelSize {
        match self {
            ScenePrefix::Gitco | ScenePrefix::Vf375 => PixelSize::I375,
            _ => PixelSize::M750,
        }
    }

    /// File name glob for this product at `date`
    pub fn file_pattern(&self, date: &ImageDate) -> String {
        format!(
            "{}_npp_{}_e???????_b00001_c{}_all-_dev.{}",
            self.as_str(),
            date.token(),
            "?".repeat(20),
            self.extension()
        )
    }
}

impl std::fmt::Display for ScenePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Located product files for one scene
#[derive(Debug, Clone)]
pub struct FileSet {
    date: ImageDate,
    files: HashMap<ScenePrefix, PathBuf>,
}

impl FileSet {
    /// Find one file per requested prefix under `base_dir`.
    ///
    /// Any prefix without a match is a [`FireError::MissingInput`].
    pub fn locate(base_dir: &Path, date: &ImageDate, prefixes: &[ScenePrefix]) -> FireResult<Self> {
        let mut files = HashMap::new();
        for &prefix in prefixes {
            files.insert(prefix, find_scene_file(base_dir, date, prefix)?);
        }
        Ok(Self {
            date: date.clone(),
            files,
        })
    }

    pub fn date(&self) -> &ImageDate {
        &self.date
    }

    pub fn path(&self, prefix: ScenePrefix) -> FireResult<&Path> {
        self.files.get(&prefix).map(PathBuf::as_path).ok_or_else(|| {
            FireError::Processing(format!("{} was not located for {}", prefix, self.date))
        })
    }
}

/// Locate the product file for `prefix` at `date`
pub fn find_scene_file(base_dir: &Path, date: &ImageDate, prefix: ScenePrefix) -> FireResult<PathBuf> {
    let dir = glob::Pattern::escape(&base_dir.to_string_lossy());
    let pattern = format!("{}/{}", dir.trim_end_matches('/'), prefix.file_pattern(date));

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(Result::ok).collect();
    matches.sort();

    if matches.len() > 1 {
        log::warn!(
            "{} files match {} for {}, using {}",
            matches.len(),
            prefix,
            date,
            matches[0].display()
        );
    }
    matches
        .into_iter()
        .next()
        .ok_or_else(|| FireError::missing_input(prefix.as_str(), &pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_image_date() {
        let date = ImageDate::parse("d20140715_t1921193").unwrap();
        assert_eq!(date.datetime().year(), 2014);
        assert_eq!(date.datetime().month(), 7);
        assert_eq!(date.datetime().hour(), 19);
        assert_eq!(date.datetime().second(), 19);
        assert_eq!(date.out_date(), "20140715_192119");
        assert_eq!(date.sql_date(), "2014-07-15 19:21:19");
        assert_eq!(date.token(), "d20140715_t1921193");
    }

    #[test]
    fn test_invalid_image_dates() {
        for bad in [
            "20140715_t1921193",
            "d2014071_t1921193",
            "d20141315_t1921193",
            "d20140715_t19211",
            "d20140715_t19211x3",
            "d20140715-t1921193",
            "boo",
        ] {
            assert!(matches!(ImageDate::parse(bad), Err(FireError::InvalidImageDate(_))));
        }
    }

    #[test]
    fn test_sub_second_digits_are_optional() {
        let date = ImageDate::parse(" d20140715_t192119 ").unwrap();
        assert_eq!(date.token(), "d20140715_t192119");
        assert_eq!(date.sql_date(), "2014-07-15 19:21:19");
    }

    #[test]
    fn test_image_date_from_filename() {
        let name = "SVM07_npp_d20130503_t2104190_e2105432_b00001_c20130504033017262758_all-_dev.h5";
        let date = ImageDate::from_filename(name).unwrap();
        assert_eq!(date.token(), "d20130503_t2104190");
    }

    #[test]
    fn test_image_dates_order_chronologically() {
        let mut dates = vec![
            ImageDate::parse("d20130504_t0100000").unwrap(),
            ImageDate::parse("d20130503_t2359590").unwrap(),
        ];
        dates.sort();
        assert_eq!(dates[0].token(), "d20130503_t2359590");
    }

    #[test]
    fn test_file_pattern() {
        let date = ImageDate::parse("d20130503_t2104190").unwrap();
        assert_eq!(
            ScenePrefix::Vf375.file_pattern(&date),
            "VF375_npp_d20130503_t2104190_e???????_b00001_c????????????????????_all-_dev.hdf"
        );
        assert_eq!(ScenePrefix::Gitco.pixel_size(), PixelSize::I375);
        assert_eq!(ScenePrefix::Avafo.pixel_size(), PixelSize::M750);
    }
}
