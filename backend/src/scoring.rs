use crate::models::{AnnotatedRoute, RouteConditions, WeatherObservation};

/// Score given to a sample or segment without weather data.
pub const NEUTRAL_SCORE: u8 = 50;

const MAX_SCORE: i32 = 100;
const HIGH_PRECIPITATION_PCT: u8 = 70;
const MODERATE_PRECIPITATION_PCT: u8 = 40;
const OVERCAST_CLOUD_PCT: u8 = 80;

/// WMO weather codes grouped by how much they degrade a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    Other,
}

impl WeatherCategory {
    pub fn from_wmo_code(code: u16) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 | 3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 => Self::Rain,
            71 | 73 | 75 | 77 => Self::Snow,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Other,
        }
    }

    pub fn penalty(self) -> i32 {
        match self {
            Self::Clear | Self::Other => 0,
            Self::Cloudy => 10,
            Self::Fog => 30,
            Self::Drizzle => 25,
            Self::Rain => 40,
            Self::Snow => 50,
            Self::RainShowers => 35,
            Self::SnowShowers => 45,
            Self::Thunderstorm => 60,
        }
    }
}

/// Desirability of one observation on a 0-100 scale, higher is better.
///
/// Missing data scores [`NEUTRAL_SCORE`] so it never tips a comparison either way.
pub fn score(observation: Option<&WeatherObservation>) -> u8 {
    let Some(weather) = observation else {
        return NEUTRAL_SCORE;
    };

    let mut score = MAX_SCORE;
    score -= WeatherCategory::from_wmo_code(weather.weather_code).penalty();

    if weather.precipitation_prob_pct > HIGH_PRECIPITATION_PCT {
        score -= 20;
    } else if weather.precipitation_prob_pct > MODERATE_PRECIPITATION_PCT {
        score -= 10;
    }

    if weather.cloud_cover_pct > OVERCAST_CLOUD_PCT {
        score -= 5;
    }

    score.clamp(0, MAX_SCORE) as u8
}

/// Rounded mean of the per-sample scores, neutral when there are none.
pub fn average_score<'a, I>(samples: I) -> u8
where
    I: IntoIterator<Item = Option<&'a WeatherObservation>>,
{
    let (total, count) = samples
        .into_iter()
        .fold((0u32, 0u32), |(total, count), sample| {
            (total + u32::from(score(sample)), count + 1)
        });

    if count == 0 {
        return NEUTRAL_SCORE;
    }
    (f64::from(total) / f64::from(count)).round() as u8
}

/// Count segments per broad condition and derive the sun/rain shares.
///
/// Buckets by WMO code: `>= 95` storm, `>= 71` snow, `>= 51` rain, `>= 45` fog,
/// `<= 1` sun. Codes 2-44 (clouds) fall in none of them.
pub fn summarize_conditions(route: &AnnotatedRoute) -> RouteConditions {
    let mut conditions = RouteConditions::default();

    for segment in &route.segments {
        let Some(weather) = &segment.weather else {
            conditions.unknown += 1;
            continue;
        };
        match weather.weather_code {
            95.. => conditions.storm += 1,
            71.. => conditions.snow += 1,
            51.. => conditions.rain += 1,
            45.. => conditions.fog += 1,
            0 | 1 => conditions.sun += 1,
            _ => {}
        }
    }

    let total = route.segments.len();
    conditions.sun_percent = percent(conditions.sun, total);
    conditions.rain_percent = percent(conditions.rain + conditions.storm, total);
    conditions.average_score =
        average_score(route.segments.iter().map(|segment| segment.weather.as_ref()));
    conditions
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u8
}
