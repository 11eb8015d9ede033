use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    pub code: &'static str,
    pub name: &'static str,
}

const fn team(code: &'static str, name: &'static str) -> Team {
    Team { code, name }
}

pub const MLB_TEAMS: [Team; 30] = [
    team("ARI", "Arizona Diamondbacks"),
    team("ATL", "Atlanta Braves"),
    team("BAL", "Baltimore Orioles"),
    team("BOS", "Boston Red Sox"),
    team("CHC", "Chicago Cubs"),
    team("CWS", "Chicago White Sox"),
    team("CIN", "Cincinnati Reds"),
    team("CLE", "Cleveland Guardians"),
    team("COL", "Colorado Rockies"),
    team("DET", "Detroit Tigers"),
    team("HOU", "Houston Astros"),
    team("KC", "Kansas City Royals"),
    team("LAA", "Los Angeles Angels"),
    team("LAD", "Los Angeles Dodgers"),
    team("MIA", "Miami Marlins"),
    team("MIL", "Milwaukee Brewers"),
    team("MIN", "Minnesota Twins"),
    team("NYM", "New York Mets"),
    team("NYY", "New York Yankees"),
    team("OAK", "Oakland Athletics"),
    team("PHI", "Philadelphia Phillies"),
    team("PIT", "Pittsburgh Pirates"),
    team("SD", "San Diego Padres"),
    team("SF", "San Francisco Giants"),
    team("SEA", "Seattle Mariners"),
    team("STL", "St. Louis Cardinals"),
    team("TB", "Tampa Bay Rays"),
    team("TEX", "Texas Rangers"),
    team("TOR", "Toronto Blue Jays"),
    team("WSH", "Washington Nationals"),
];

/// Look up a team by code, ignoring case.
pub fn find_team(code: &str) -> Option<Team> {
    MLB_TEAMS
        .iter()
        .find(|team| team.code.eq_ignore_ascii_case(code.trim()))
        .copied()
}
