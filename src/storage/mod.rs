#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod postgres;

#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub(crate) use postgres::PgStore;
