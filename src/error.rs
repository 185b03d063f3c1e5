use thiserror::Error;

/// Fatal failure modes of the nanoparticle pipeline.
///
/// None of these are retried or recovered internally; every variant aborts
/// the run before any output is written.
#[derive(Debug, Error)]
pub enum WulffError {
    /// No access credential for the structure database.
    #[error("missing Materials Project API key: pass --api-key or export MP_API_KEY")]
    MissingApiKey,

    /// The structure provider could not deliver the requested entry
    /// (transport, auth, or an unknown identifier).
    #[error("failed to retrieve structure '{id}': {detail}")]
    Retrieval { id: String, detail: String },

    /// A Miller index with no resolvable plane normal, e.g. (0 0 0).
    #[error("Miller index ({h} {k} {l}) yields a zero-length normal for this lattice")]
    DegenerateMiller { h: i32, k: i32, l: i32 },

    /// At least one facet is required to bound the polyhedron.
    #[error("the facet table is empty")]
    NoFacets,

    /// The half-space filter rejected every atom.
    #[error("no atoms fall inside the Wulff polyhedron; increase the scale factor")]
    EmptyCluster,
}
