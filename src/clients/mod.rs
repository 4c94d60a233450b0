pub mod soap_client;
