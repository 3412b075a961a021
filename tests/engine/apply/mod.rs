mod atomicity;
mod batch;
mod optimistic_lock;
