//! Repository vocabulary, reserved names, and bus header keys.

// --- Type IRIs ---
pub const LDP_CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
pub const LDP_NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
pub const LDP_CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
pub const FEDORA_BINARY: &str = "http://fedora.info/definitions/v4/repository#Binary";
pub const WEBAC_ACL: &str = "http://fedora.info/definitions/v4/webac#Acl";

/// Types that mark a raw binary. Stripped from a binary's metadata companion.
pub const BINARY_TYPES: &[&str] = &[FEDORA_BINARY, LDP_NON_RDF_SOURCE];

/// Compact prefixes accepted in relation names and type lists.
pub const PREFIXES: &[(&str, &str)] = &[
    ("ldp", "http://www.w3.org/ns/ldp#"),
    ("fedora", "http://fedora.info/definitions/v4/repository#"),
    ("webac", "http://fedora.info/definitions/v4/webac#"),
    ("pcdm", "http://pcdm.org/models#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("ore", "http://www.openarchives.org/ore/terms/"),
];

// --- Reserved sub-resources ---
pub const RESERVED_MARKER: &str = "/fcr:";
pub const ACL_SUFFIX: &str = "/fcr:acl";
pub const METADATA_SUFFIX: &str = "/fcr:metadata";

// --- Payload ---
/// Reserved key carrying event provenance on indexed documents.
pub const PROVENANCE_KEY: &str = "_strata";
pub const JSONLD_ID: &str = "@id";
pub const JSONLD_TYPE: &str = "@type";
pub const JSONLD_GRAPH: &str = "@graph";
pub const JSONLD_MEDIA_TYPE: &str = "application/ld+json";

// --- Bus headers ---
/// Present (value `true`) on internal events.
pub const HEADER_INTERNAL: &str = "strata.internal";
pub const HEADER_EVENT_TYPE: &str = "strata.eventType";
pub const HEADER_EVENT_ID: &str = "org.fcrepo.jms.eventID";
pub const HEADER_TIMESTAMP: &str = "org.fcrepo.jms.timestamp";
pub const HEADER_IDENTIFIER: &str = "org.fcrepo.jms.identifier";
pub const HEADER_RESOURCE_TYPE: &str = "org.fcrepo.jms.resourceType";

// --- Status messages ---
pub const MSG_NO_MODEL: &str = "no model for container";
pub const MSG_RAW_BINARY: &str = "raw binary";
