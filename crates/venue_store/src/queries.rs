/// Most recent API key whose effective window covers today
pub const GET_ACTIVE_API_KEY: &str = r#"
    SELECT API_KEY FROM resy.t_api_keys
    WHERE EFFECTIVE_DATE <= CURDATE()
    AND IFNULL(TERMINATED_DATE, '3000-01-01') > CURDATE()
    ORDER BY EFFECTIVE_DATE DESC
    LIMIT 1
"#;

/// Venue ID and display name for a URL slug
pub const GET_VENUE_INFO: &str = r#"
    SELECT CAST(VENUE_ID AS SIGNED) AS VENUE_ID, VENUE_NAME FROM resy.t_venues
    WHERE VENUE_URL_NAME = ?
    LIMIT 1
"#;
