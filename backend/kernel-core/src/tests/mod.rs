mod connection;
mod execution;
mod kernelspec;
