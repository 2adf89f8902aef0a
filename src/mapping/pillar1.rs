//! Pillar 1: growth, structure and fiscal buffers.

use super::{Pillar, SeriesMap};
use crate::domain::Source;

pub const NAME: &str = "pillar1";

pub const WDI: [(&str, &str); 7] = [
    // Growth
    ("gdp_growth_real_wdi", "NY.GDP.MKTP.KD.ZG"),
    ("gdp_pc_growth_wdi", "NY.GDP.PCAP.KD.ZG"),
    // Structure / diversification proxies
    ("agri_share_gdp", "NV.AGR.TOTL.ZS"),
    ("ind_share_gdp", "NV.IND.TOTL.ZS"),
    ("serv_share_gdp", "NV.SRV.TOTL.ZS"),
    ("resource_rents_gdp", "NY.GDP.TOTL.RT.ZS"),
    // Financial depth
    ("private_credit_gdp", "FS.AST.PRVT.GD.ZS"),
];

pub const WEO: [(&str, &str); 4] = [
    ("gdp_growth_real_weo", "NGDP_RPCH"),
    ("gov_debt_gdp", "GGXWDN_NGDP"),
    ("fiscal_balance_gdp", "GGB_NGDP"),
    // Not published for every country.
    ("primary_balance_gdp", "GGXONLB_NGDP"),
];

pub fn pillar() -> Pillar {
    Pillar {
        name: NAME,
        wdi: SeriesMap::new(Source::Wdi, &WDI),
        weo: SeriesMap::new(Source::Weo, &WEO),
    }
}
