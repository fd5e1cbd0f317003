// Writes that change what matches: profile skill edits and new job postings.

pub mod handlers;
