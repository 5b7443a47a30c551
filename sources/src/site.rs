//!  Module that defines what is a site, i.e. one FDSN event endpoint.
//!
//! The list of possible feeds is embedded from `sites.hcl`.  FDSN services agree on
//! `starttime`/`endtime` but not on the output format name nor on the minimum magnitude
//! parameter, hence the `output` and `min_mag` fields.
//!

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::trace;

use terremoto_formats::Format;

use crate::FetchError;

/// Current `sites.hcl` version
const SVERSION: usize = 1;

/// Describe what a site is.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Site {
    /// Name of the site, filled in from the block label
    #[serde(default)]
    pub name: String,
    /// Free text description
    pub description: String,
    /// Schema of the returned data
    pub format: Format,
    /// Query endpoint
    pub base_url: String,
    /// Value of the `format=` parameter
    pub output: String,
    /// Name of the minimum magnitude parameter
    pub min_mag: String,
}

/// On-disk structure for the sites file
///
#[derive(Debug, Deserialize)]
struct SitesFile {
    /// Version number for safety
    version: usize,
    /// List of sites
    site: BTreeMap<String, Site>,
}

/// All known sites.
///
#[derive(Clone, Debug)]
pub struct Sites(BTreeMap<String, Site>);

impl Sites {
    /// Load the built-in catalogue.
    ///
    #[tracing::instrument]
    pub fn load() -> Result<Self, FetchError> {
        Self::from_hcl(include_str!("sites.hcl"))
    }

    /// Load a catalogue from its HCL text.
    ///
    #[tracing::instrument(skip(data))]
    pub fn from_hcl(data: &str) -> Result<Self, FetchError> {
        let sf: SitesFile = hcl::from_str(data).map_err(|e| FetchError::Catalogue(e.to_string()))?;
        if sf.version != SVERSION {
            return Err(FetchError::BadFileVersion(sf.version));
        }

        let all = sf
            .site
            .into_iter()
            .map(|(name, site)| (name.clone(), Site { name, ..site }))
            .collect();
        Ok(Sites(all))
    }

    /// Find a site by name.
    ///
    #[tracing::instrument(skip(self))]
    pub fn get(&self, name: &str) -> Result<Site, FetchError> {
        trace!("Loading site {}", name);
        self.0
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| FetchError::UnknownSite(name.to_string()))
    }

    pub fn names(&self) -> Vec<&String> {
        self.0.keys().collect()
    }

    /// List all sites as a table.
    ///
    pub fn list(&self) -> String {
        let header = vec!["Name", "Format", "Description", "URL"];

        let mut builder = Builder::default();
        builder.push_record(header);

        self.0.iter().for_each(|(name, site)| {
            let format = site.format.to_string();
            builder.push_record(vec![
                name.as_str(),
                format.as_str(),
                site.description.as_str(),
                site.base_url.as_str(),
            ]);
        });

        let allf = builder.build().with(Style::modern()).to_string();
        format!("List all sites:\n{allf}")
    }
}
