//! Common RDF vocabulary namespaces used across queries and serialization

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
pub const ONTOLEX: &str = "http://www.w3.org/ns/lemon/ontolex#";
pub const TREE: &str = "https://w3id.org/lemon-tree#";
pub const OA: &str = "http://www.w3.org/ns/oa#";

pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

/// Prefix table used when serializing the local store to Turtle
pub const TURTLE_PREFIXES: [(&str, &str); 8] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("owl", OWL),
    ("skos", SKOS),
    ("dcterms", DCTERMS),
    ("ontolex", ONTOLEX),
    ("tree", TREE),
    ("oa", OA),
];
