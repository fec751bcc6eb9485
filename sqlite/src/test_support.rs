use relata_core::{
    ChangeEvent, ColumnDef, Connection, EventHub, Model, Result, Row, Schema, Value,
};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Person {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
        }
    }
}

impl Model for Person {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Person>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(
                "people",
                vec![
                    ColumnDef::new("id", |p: &Person| p.id.into()).auto_id(),
                    ColumnDef::new("name", |p: &Person| p.name.as_str().into()),
                    ColumnDef::new("age", |p: &Person| p.age.into()),
                ],
            )
            .unwrap()
        })
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
        })
    }
}

pub(crate) fn column(name: &str) -> &'static ColumnDef<Person> {
    Person::schema().column(name).unwrap()
}

pub(crate) fn person_row(person: &Person) -> Row {
    Row::new(
        Person::schema().labels(),
        vec![
            person.id.into(),
            person.name.as_str().into(),
            person.age.into(),
        ],
    )
}

pub(crate) fn count_row(count: i64) -> Row {
    Row::new(Arc::from(vec!["COUNT(*)".to_string()]), vec![count.into()])
}

/// Connection double that records every statement and replays canned results.
#[derive(Default)]
pub(crate) struct Recording {
    pub statements: Mutex<Vec<(String, Vec<Value>)>>,
    pub query_results: Mutex<VecDeque<Vec<Row>>>,
    pub execute_results: Mutex<VecDeque<usize>>,
    pub events: Mutex<Vec<ChangeEvent>>,
    pub units: Mutex<u32>,
    pub next_id: Mutex<i64>,
    hub: EventHub,
}

impl Recording {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_query(&self, rows: Vec<Row>) {
        self.query_results.lock().unwrap().push_back(rows);
    }

    pub fn push_execute(&self, changed: usize) {
        self.execute_results.lock().unwrap().push_back(changed);
    }

    pub fn statements(&self) -> Vec<(String, Vec<Value>)> {
        self.statements.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.statements.lock().unwrap().last().unwrap().0.clone()
    }

    fn record(&self, sql: &str, args: &[Value]) {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
    }
}

impl Connection for Recording {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<usize> {
        self.record(sql, args);
        Ok(self.execute_results.lock().unwrap().pop_front().unwrap_or(0))
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>> {
        self.record(sql, args);
        Ok(self.query_results.lock().unwrap().pop_front().unwrap_or_default())
    }

    /// A queued changed-row count of 0 makes the insert a no-op.
    fn insert(&self, sql: &str, args: &[Value]) -> Result<Option<i64>> {
        self.record(sql, args);
        if self.execute_results.lock().unwrap().pop_front() == Some(0) {
            return Ok(None);
        }
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        Ok(Some(*next))
    }

    fn transaction_sync(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        *self.units.lock().unwrap() += 1;
        work()
    }

    fn notify(&self, event: ChangeEvent) {
        self.hub.publish(&event);
        self.events.lock().unwrap().push(event);
    }

    fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.hub.subscribe()
    }
}
