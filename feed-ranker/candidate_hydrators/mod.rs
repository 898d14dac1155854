pub mod content_hash_hydrator;
pub mod in_network_candidate_hydrator;
pub mod vf_candidate_hydrator;
